use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blogwatch::app::AppContext;
use blogwatch::cli::{commands, Cli, Commands};
use blogwatch::config::Config;
use blogwatch::daemon::{Daemon, DaemonConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Add {
            url,
            name,
            category,
            insecure_tls,
        } => {
            commands::add_blog(&ctx, &url, name, category, insecure_tls)?;
        }
        Commands::Remove { url } => {
            commands::remove_blog(&ctx, &url)?;
        }
        Commands::List => {
            commands::list_blogs(&ctx)?;
        }
        Commands::Pause { url } => {
            commands::set_active(&ctx, &url, false)?;
        }
        Commands::Resume { url } => {
            commands::set_active(&ctx, &url, true)?;
        }
        Commands::Subscribe { email, url } => {
            commands::subscribe(&ctx, &email, &url)?;
        }
        Commands::Unsubscribe { email, url } => {
            commands::unsubscribe(&ctx, &email, &url)?;
        }
        Commands::Posts { email, mark_seen } => {
            commands::list_posts(&ctx, &email, mark_seen)?;
        }
        Commands::Fetch { url, insecure_tls } => {
            commands::fetch_blog(&ctx, &url, insecure_tls).await?;
        }
        Commands::Check => {
            commands::check_blogs(&ctx).await?;
        }
        Commands::Watch {
            interval,
            no_initial_run,
        } => {
            let config = DaemonConfig::from_args(&interval, no_initial_run)?;
            Daemon::new(Arc::new(ctx), config).run().await?;
        }
    }

    Ok(())
}
