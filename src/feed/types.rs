use serde::Deserialize;
use thiserror::Error;

/// A validated notification, as handed to the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    pub id: String,
    pub reason: String,
    pub repository_full_name: String,
}

/// Result of one conditional GET against the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub items: Vec<NotificationItem>,
    /// Server-advised delay before the next poll, when it sent a usable one.
    pub next_poll_seconds: Option<u64>,
    /// Validator to echo back on the next request (`Last-Modified`).
    pub cache_token: Option<String>,
    /// Set only by [`FetchOutcome::soft_failure`].
    pub failed: bool,
}

impl FetchOutcome {
    /// The sentinel for a transport error or unexpected status.
    pub fn soft_failure() -> Self {
        Self {
            failed: true,
            ..Self::default()
        }
    }

    pub fn is_soft_failure(&self) -> bool {
        self.failed
    }
}

/// Payload failures. Both are fatal: alerting on garbage is worse than stopping.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("notification #{index} is malformed: {detail}")]
    MalformedItem { index: usize, detail: String },

    #[error("notification feed body is not a JSON array: {0}")]
    MalformedBody(#[source] serde_json::Error),
}

/// GitHub `/notifications` element. Only the fields we read are modelled.
#[derive(Debug, Deserialize)]
struct RawNotification {
    id: Option<String>,
    reason: Option<String>,
    repository: Option<RawRepository>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    full_name: Option<String>,
}

fn required(value: Option<String>, index: usize, field: &str) -> Result<String, FeedError> {
    value.ok_or_else(|| FeedError::MalformedItem {
        index,
        detail: format!("missing `{}`", field),
    })
}

/// Decode and validate a 2xx response body.
pub fn parse_notifications(body: &str) -> Result<Vec<NotificationItem>, FeedError> {
    let elements: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(FeedError::MalformedBody)?;

    elements
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let raw: RawNotification =
                serde_json::from_value(value).map_err(|e| FeedError::MalformedItem {
                    index,
                    detail: e.to_string(),
                })?;
            let full_name = raw.repository.and_then(|r| r.full_name);
            Ok(NotificationItem {
                id: required(raw.id, index, "id")?,
                reason: required(raw.reason, index, "reason")?,
                repository_full_name: required(full_name, index, "repository.full_name")?,
            })
        })
        .collect()
}
