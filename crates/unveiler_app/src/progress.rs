use std::io::{self, Write};

use unveiler_core::LoadProgress;
use unveiler_engine::ProgressSink;

/// Rewrites one status line on stderr while a fetch burst runs.
pub struct TerminalProgress {
    enabled: bool,
}

impl TerminalProgress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Move past the status line once loading is over.
    pub fn finish(&self) {
        if self.enabled {
            eprintln!();
        }
    }
}

impl ProgressSink for TerminalProgress {
    fn emit(&self, progress: LoadProgress) {
        if !self.enabled {
            return;
        }
        let mut stderr = io::stderr().lock();
        let _ = write!(
            stderr,
            "\rLoading... {} comments, {} posts",
            progress.comments, progress.posts
        );
        let _ = stderr.flush();
    }
}
