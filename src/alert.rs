use crate::config::AlertConfig;
use crate::feed::types::NotificationItem;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

/// One desktop popup. The title is the sink's app name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub summary: String,
    pub body: String,
}

impl Alert {
    pub fn for_item(item: &NotificationItem) -> Self {
        Self {
            summary: format!("{} in {}", item.reason, item.repository_full_name),
            body: String::new(),
        }
    }
}

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify(&self, alert: &Alert) -> Result<()>;
}

/// Freedesktop notifications through the `notify-send` helper.
pub struct DesktopNotifier {
    command: String,
    app_name: String,
    expire_timeout_ms: u32,
}

impl DesktopNotifier {
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            command: config.command.clone(),
            app_name: config.app_name.clone(),
            expire_timeout_ms: config.expire_timeout_ms,
        }
    }

    fn args(&self, alert: &Alert) -> Vec<String> {
        vec![
            format!("--app-name={}", self.app_name),
            format!("--expire-time={}", self.expire_timeout_ms),
            alert.summary.clone(),
            alert.body.clone(),
        ]
    }
}

#[async_trait]
impl AlertSink for DesktopNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        let output = Command::new(&self.command)
            .args(self.args(alert))
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to run `{}`", self.command))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "`{}` exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(command: &str) -> DesktopNotifier {
        DesktopNotifier::new(&AlertConfig {
            command: command.to_string(),
            ..AlertConfig::default()
        })
    }

    #[test]
    fn test_summary_format() {
        let item = NotificationItem {
            id: "1".to_string(),
            reason: "review_requested".to_string(),
            repository_full_name: "rust-lang/rust".to_string(),
        };
        let alert = Alert::for_item(&item);
        assert_eq!(alert.summary, "review_requested in rust-lang/rust");
        assert!(alert.body.is_empty());
    }

    #[test]
    fn test_notify_send_args() {
        let alert = Alert {
            summary: "mention in x/y".to_string(),
            body: String::new(),
        };
        assert_eq!(
            notifier("notify-send").args(&alert),
            vec!["--app-name=GitHub", "--expire-time=0", "mention in x/y", ""]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_helper() {
        let alert = Alert {
            summary: "mention in x/y".to_string(),
            body: String::new(),
        };
        notifier("true").notify(&alert).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_helper_is_error() {
        let alert = Alert {
            summary: "mention in x/y".to_string(),
            body: String::new(),
        };
        assert!(notifier("false").notify(&alert).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_helper_is_error() {
        let alert = Alert {
            summary: "mention in x/y".to_string(),
            body: String::new(),
        };
        assert!(notifier("gh-notify-no-such-notifier").notify(&alert).await.is_err());
    }
}
