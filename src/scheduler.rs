use crate::alert::AlertSink;
use crate::config::Config;
use crate::credential::CredentialProvider;
use crate::feed::types::FetchOutcome;
use crate::feed::NotificationFeed;
use crate::reconcile::{reconcile, SeenSet};
use anyhow::{Context, Result};
use std::time::Duration;

/// State carried from one cycle to the next.
pub struct PollState {
    pub cache_token: Option<String>,
    pub seen: SeenSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleResult {
    /// Always positive.
    pub next_poll_seconds: u64,
    pub cache_token: Option<String>,
    pub alerts_dispatched: usize,
}

/// Drives credential -> fetch -> reconcile -> sleep, one cycle at a time.
pub struct PollScheduler {
    feed: Box<dyn NotificationFeed>,
    credentials: Box<dyn CredentialProvider>,
    sink: Box<dyn AlertSink>,
    fallback_poll_seconds: u64,
    state: PollState,
}

/// Server-advised delay, or the fallback when it is missing or zero.
fn next_poll_seconds(outcome: &FetchOutcome, fallback: u64) -> u64 {
    outcome
        .next_poll_seconds
        .filter(|secs| *secs > 0)
        .unwrap_or(fallback)
        .max(1)
}

impl PollScheduler {
    pub fn new(
        feed: Box<dyn NotificationFeed>,
        credentials: Box<dyn CredentialProvider>,
        sink: Box<dyn AlertSink>,
        config: &Config,
    ) -> Self {
        Self {
            feed,
            credentials,
            sink,
            fallback_poll_seconds: config.feed.fallback_poll_interval_s,
            state: PollState {
                cache_token: None,
                seen: SeenSet::with_capacity_limit(config.seen.max_entries),
            },
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// One Polling transition. Errors are fatal: the credential helper failed
    /// or the feed returned a payload we refuse to interpret.
    pub async fn run_cycle(&mut self) -> Result<CycleResult> {
        tracing::info!("running poll");

        let token = self
            .credentials
            .get_token()
            .await
            .context("cannot obtain a GitHub token")?;

        let outcome = self
            .feed
            .fetch(self.state.cache_token.as_deref(), &token)
            .await
            .context("notification feed returned an unusable payload")?;

        if outcome.is_soft_failure() {
            tracing::warn!("poll failed, no notifications this cycle");
        }
        if outcome.next_poll_seconds.is_none() {
            tracing::warn!(
                fallback_s = self.fallback_poll_seconds,
                "no usable X-Poll-Interval, using fallback delay"
            );
        }

        let alerts_dispatched =
            reconcile(&outcome.items, &mut self.state.seen, self.sink.as_ref()).await;

        let next_poll_seconds = next_poll_seconds(&outcome, self.fallback_poll_seconds);
        // A failed cycle keeps the last good validator.
        if let Some(token) = outcome.cache_token {
            self.state.cache_token = Some(token);
        }

        tracing::debug!(
            items = outcome.items.len(),
            alerts = alerts_dispatched,
            seen = self.state.seen.len(),
            cache_token = ?self.state.cache_token,
            "poll cycle complete"
        );

        Ok(CycleResult {
            next_poll_seconds,
            cache_token: self.state.cache_token.clone(),
            alerts_dispatched,
        })
    }

    /// Poll until a fatal error. There is no in-process cancellation; the
    /// caller drops this future to stop.
    pub async fn run(mut self) -> Result<()> {
        loop {
            let cycle = self.run_cycle().await?;
            tracing::info!("sleeping for {} seconds", cycle.next_poll_seconds);
            tokio::time::sleep(Duration::from_secs(cycle.next_poll_seconds)).await;
        }
    }
}
