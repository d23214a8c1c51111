use super::types::*;
use super::NotificationFeed;
use crate::config::FeedConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, IF_MODIFIED_SINCE, LAST_MODIFIED};
use reqwest::{Client, StatusCode};
use std::time::Duration;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const POLL_INTERVAL_HEADER: &str = "X-Poll-Interval";

/// Client for the GitHub `/notifications` REST endpoint.
pub struct GitHubNotifications {
    client: Client,
    endpoint: String,
    api_version: String,
}

/// `X-Poll-Interval` in seconds. Zero or unparseable values are treated as absent.
fn parse_poll_interval(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(POLL_INTERVAL_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
}

fn parse_cache_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

impl GitHubNotifications {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_version: config.api_version.clone(),
        })
    }
}

#[async_trait]
impl NotificationFeed for GitHubNotifications {
    async fn fetch(
        &self,
        cache_token: Option<&str>,
        auth_token: &str,
    ) -> Result<FetchOutcome, FeedError> {
        let mut req = self
            .client
            .get(&self.endpoint)
            .bearer_auth(auth_token)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(API_VERSION_HEADER, self.api_version.as_str());
        if let Some(token) = cache_token {
            req = req.header(IF_MODIFIED_SINCE, token);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "notifications request failed");
                return Ok(FetchOutcome::soft_failure());
            }
        };

        let status = resp.status();
        let next_poll_seconds = parse_poll_interval(resp.headers());
        let new_cache_token = parse_cache_token(resp.headers());

        // Unchanged since the validator we sent
        if status == StatusCode::NOT_MODIFIED {
            tracing::debug!(?next_poll_seconds, "notifications not modified");
            return Ok(FetchOutcome {
                items: Vec::new(),
                next_poll_seconds,
                cache_token: new_cache_token,
                failed: false,
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                body = %body,
                "notifications endpoint returned an error"
            );
            return Ok(FetchOutcome::soft_failure());
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read notifications body");
                return Ok(FetchOutcome::soft_failure());
            }
        };

        let items = parse_notifications(&body).map_err(|e| {
            tracing::error!(error = %e, "failed to interpret notification from body:\n{}", body);
            e
        })?;

        Ok(FetchOutcome {
            items,
            next_poll_seconds,
            cache_token: new_cache_token,
            failed: false,
        })
    }
}
