pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "blogwatch")]
#[command(about = "Watch blogs for new posts", long_about = None)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start monitoring a blog
    Add {
        /// Base URL of the blog
        url: String,
        /// Display name (default: the blog's domain)
        #[arg(long)]
        name: Option<String>,
        /// Category label
        #[arg(long)]
        category: Option<String>,
        /// Fetch this blog without verifying its TLS certificate
        #[arg(long)]
        insecure_tls: bool,
    },
    /// Stop monitoring a blog
    Remove {
        url: String,
    },
    /// List monitored blogs
    List,
    /// Exclude a blog from checks without removing it
    Pause {
        url: String,
    },
    /// Include a paused blog in checks again
    Resume {
        url: String,
    },
    /// Subscribe an email address to a monitored blog
    Subscribe {
        email: String,
        url: String,
    },
    /// Remove a subscription
    Unsubscribe {
        email: String,
        url: String,
    },
    /// Show posts recorded for a subscriber
    Posts {
        email: String,
        /// Mark the listed posts as seen
        #[arg(long)]
        mark_seen: bool,
    },
    /// Fetch a blog once and print what was found, without storing anything
    Fetch {
        url: String,
        #[arg(long)]
        insecure_tls: bool,
    },
    /// Check every active blog once
    Check,
    /// Check every active blog on a fixed interval
    Watch {
        /// Interval between runs (e.g., "30m", "6h", "1d")
        #[arg(short, long, default_value = "1d")]
        interval: String,

        /// Wait a full interval before the first run
        #[arg(long)]
        no_initial_run: bool,
    },
}
