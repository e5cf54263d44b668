use std::sync::{mpsc, Mutex};

use unveiler_core::{LoadProgress, RecordKind};

/// Receives running record counts during a fetch burst.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, progress: LoadProgress);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<LoadProgress>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<LoadProgress>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, progress: LoadProgress) {
        let _ = self.tx.send(progress);
    }
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _progress: LoadProgress) {}
}

/// Combines per-kind counts from concurrent walks into one running snapshot.
pub struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    counts: Mutex<LoadProgress>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self::starting_at(sink, LoadProgress::default())
    }

    /// Tracker whose untouched kind keeps reporting `counts`.
    pub fn starting_at(sink: &'a dyn ProgressSink, counts: LoadProgress) -> Self {
        Self {
            sink,
            counts: Mutex::new(counts),
        }
    }

    pub fn report(&self, kind: RecordKind, count: usize) {
        let snapshot = {
            let Ok(mut counts) = self.counts.lock() else {
                return;
            };
            match kind {
                RecordKind::Posts => counts.posts = count,
                RecordKind::Comments => counts.comments = count,
            }
            *counts
        };
        self.sink.emit(snapshot);
    }
}
