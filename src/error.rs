use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("request failed: {method} {url}: {reason}")]
    Transport {
        method: String,
        url: String,
        reason: String,
    },

    #[error("unexpected status {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("config parse error: {0}")]
    Config(String),

    #[error("missing setting {key} (set {env} or add it to the config file)")]
    MissingSetting { key: &'static str, env: &'static str },

    #[error("bulk batch of {size} annotations exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("invalid analysis input: {0}")]
    Input(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("toml render error: {0}")]
    TomlRender(#[from] toml::ser::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl InsightsError {
    /// True for failures of the HTTP exchange itself, as opposed to bad input
    /// or an unreadable response.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, InsightsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_transport_errors_classify_as_transport() {
        let status = InsightsError::Status {
            status: 500,
            url: "http://example.test".to_string(),
            body: String::new(),
        };
        let transport = InsightsError::Transport {
            method: "PUT".to_string(),
            url: "http://example.test".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(status.is_transport());
        assert!(transport.is_transport());
        assert!(!InsightsError::Parse("no uuid".to_string()).is_transport());
    }

    #[test]
    fn missing_setting_names_environment_variable() {
        let err = InsightsError::MissingSetting {
            key: "repo_slug",
            env: "BITBUCKET_REPO_SLUG",
        };
        assert!(err.to_string().contains("BITBUCKET_REPO_SLUG"));
    }
}
