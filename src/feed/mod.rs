pub mod github;
pub mod types;

use async_trait::async_trait;
use types::{FeedError, FetchOutcome};

#[async_trait]
pub trait NotificationFeed: Send + Sync {
    /// One conditional GET. Transport and server faults come back as
    /// [`FetchOutcome::soft_failure`]; only payload corruption is an `Err`.
    async fn fetch(
        &self,
        cache_token: Option<&str>,
        auth_token: &str,
    ) -> Result<FetchOutcome, FeedError>;
}
