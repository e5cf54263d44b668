use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use unveiler_core::{FeedOrder, ProfileView};

/// Reconstruct a user's posts and comments from search results.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "unveiler")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Profile to reconstruct: `alice`, `u/alice` or `/user/alice/`
    #[arg(value_parser = normalize_username)]
    pub username: String,

    /// Part of the profile to reconstruct
    #[arg(long, value_enum, default_value_t = ViewArg::Overview)]
    pub view: ViewArg,

    /// Run up to N load-more passes over posts
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub more_posts: usize,

    /// Run up to N load-more passes over comments
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub more_comments: usize,

    /// Feed ordering
    #[arg(long, value_enum, default_value_t = OrderArg::New)]
    pub order: OrderArg,

    /// RON settings file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the result as JSON instead of a feed
    #[arg(long)]
    pub json: bool,

    /// Also log to the terminal
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    Overview,
    Posts,
    Comments,
}

impl From<ViewArg> for ProfileView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Overview => ProfileView::Overview,
            ViewArg::Posts => ProfileView::Posts,
            ViewArg::Comments => ProfileView::Comments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    New,
    Top,
}

impl From<OrderArg> for FeedOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::New => FeedOrder::New,
            OrderArg::Top => FeedOrder::Top,
        }
    }
}

/// Accepts `alice`, `u/alice` and `/user/alice/`.
fn normalize_username(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_matches('/');
    let name = trimmed
        .strip_prefix("u/")
        .or_else(|| trimmed.strip_prefix("user/"))
        .unwrap_or(trimmed);
    if name.is_empty()
        || !name
            .chars()
            .all(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(format!("invalid username: {raw}"));
    }
    Ok(name.to_string())
}
