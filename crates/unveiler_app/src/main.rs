mod cli;
mod progress;
mod render;
mod settings;

use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use engine_logging::{engine_info, LogDestination};
use log::LevelFilter;
use unveiler_core::LoadMoreStatus;
use unveiler_engine::{FileStore, ProfileEngine};

use crate::cli::Args;
use crate::progress::TerminalProgress;
use crate::settings::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;

    let destination = if args.verbose {
        LogDestination::Both(settings.log_file())
    } else {
        LogDestination::File(settings.log_file())
    };
    engine_logging::initialize(destination, LevelFilter::Info);

    let config = settings.engine_config()?;
    let origin = config.origin.clone();
    let store = Arc::new(FileStore::new(settings.cache_dir()));
    let progress = Arc::new(TerminalProgress::new(!args.json));
    let mut engine = ProfileEngine::with_reqwest(config, store, progress.clone())?;

    reconstruct(&mut engine, &args).await;
    progress.finish();

    let state = engine.state();
    if args.json {
        println!("{}", render::render_json(state, &origin)?);
    } else {
        print!("{}", render::render_text(state, &origin, args.order.into(), Utc::now()));
    }
    Ok(())
}

/// Seed the profile, then run the requested load-more passes.
async fn reconstruct(engine: &mut ProfileEngine, args: &Args) {
    let seed = engine.seed(&args.username, args.view.into()).await;
    engine_info!(
        "Seeded {}: {} posts, {} comments",
        args.username,
        seed.posts.len(),
        seed.comments.len()
    );

    for pass in 0..args.more_posts {
        let report = engine.load_more_posts().await;
        engine_info!("Post pass {}: {} posts", pass + 1, report.posts.len());
        if report.status == LoadMoreStatus::Exhausted || report.notice.is_some() {
            break;
        }
    }
    for pass in 0..args.more_comments {
        let report = engine.load_more_comments().await;
        engine_info!("Comment pass {}: {} comments", pass + 1, report.comments.len());
        if !report.can_continue || report.notice.is_some() {
            break;
        }
    }
}
