use anyhow::Result;
use gh_notify::alert::DesktopNotifier;
use gh_notify::config::{Config, DEFAULT_CONFIG_FILE};
use gh_notify::credential::GhCliCredentials;
use gh_notify::feed::github::GitHubNotifications;
use gh_notify::scheduler::PollScheduler;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gh_notify=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = Config::load_or_default(&config_path)?;

    let scheduler = PollScheduler::new(
        Box::new(GitHubNotifications::new(&config.feed)?),
        Box::new(GhCliCredentials::new(&config.credential)),
        Box::new(DesktopNotifier::new(&config.alert)),
        &config,
    );

    tracing::info!(endpoint = %config.feed.endpoint, "watching notifications");

    tokio::select! {
        result = scheduler.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
        }
    }

    Ok(())
}
