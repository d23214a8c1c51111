use crate::config::CredentialConfig;
use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// The credential helper could not produce a token. Always fatal.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("credential helper `{program}` could not be started: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("credential helper `{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("credential helper `{program}` printed no token")]
    Empty { program: String },

    #[error("no credential helper configured")]
    NotConfigured,
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn get_token(&self) -> Result<String, CredentialError>;
}

/// Bearer token from a pre-authenticated CLI, `gh auth token` by default.
pub struct GhCliCredentials {
    command: Vec<String>,
}

impl GhCliCredentials {
    pub fn new(config: &CredentialConfig) -> Self {
        Self {
            command: config.command.clone(),
        }
    }
}

#[async_trait]
impl CredentialProvider for GhCliCredentials {
    async fn get_token(&self) -> Result<String, CredentialError> {
        let (program, args) = self.command.split_first().ok_or(CredentialError::NotConfigured)?;

        let output = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CredentialError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CredentialError::Failed {
                program: program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(CredentialError::Empty {
                program: program.clone(),
            });
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(command: &[&str]) -> GhCliCredentials {
        GhCliCredentials::new(&CredentialConfig {
            command: command.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_token_is_trimmed_stdout() {
        let token = provider(&["sh", "-c", "printf '  gho_abc123\\n'"])
            .get_token()
            .await
            .unwrap();
        assert_eq!(token, "gho_abc123");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let err = provider(&["sh", "-c", "echo 'not logged in' >&2; exit 1"])
            .get_token()
            .await
            .unwrap_err();
        match err {
            CredentialError::Failed { stderr, .. } => assert_eq!(stderr, "not logged in"),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_blank_output_is_error() {
        let err = provider(&["sh", "-c", "echo"]).get_token().await.unwrap_err();
        assert!(matches!(err, CredentialError::Empty { .. }));
    }

    #[tokio::test]
    async fn test_missing_helper_is_spawn_error() {
        let err = provider(&["gh-notify-no-such-helper-binary"])
            .get_token()
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_empty_command_is_not_configured() {
        let err = provider(&[]).get_token().await.unwrap_err();
        assert!(matches!(err, CredentialError::NotConfigured));
    }
}
