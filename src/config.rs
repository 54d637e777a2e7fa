use crate::error::{InsightsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;

pub const DEFAULT_CONFIG_FILE: &str = ".insights.toml";
/// Plain http: the forward proxy owns the TLS leg to the API.
pub const DEFAULT_BASE_URL: &str = "http://api.bitbucket.org/2.0/";
pub const DEFAULT_PROXY_URL: &str = "http://localhost:29418";

/// Environment variables and the config keys they fill in.
const ENV_KEYS: &[(&str, &str)] = &[
    ("INSIGHTS_BASE_URL", "base_url"),
    ("INSIGHTS_PROXY_URL", "proxy_url"),
    ("BITBUCKET_REPO_OWNER", "repo_owner"),
    ("BITBUCKET_REPO_SLUG", "repo_slug"),
    ("BITBUCKET_COMMIT", "commit"),
    ("BITBUCKET_CLONE_DIR", "clone_dir"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitMode {
    /// One PUT per annotation.
    #[default]
    Single,
    /// Batched POSTs, falling back to single PUTs for a rejected batch.
    Bulk,
}

/// Everything the report client needs to address the remote API. Built once
/// and passed in explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightsConfig {
    pub base_url: String,
    /// Empty string disables the proxy.
    pub proxy_url: String,
    pub repo_owner: String,
    pub repo_slug: String,
    pub commit: String,
    pub clone_dir: PathBuf,
    pub submit_mode: SubmitMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PartialConfig {
    base_url: String,
    proxy_url: String,
    repo_owner: Option<String>,
    repo_slug: Option<String>,
    commit: Option<String>,
    clone_dir: Option<PathBuf>,
    #[serde(default)]
    submit_mode: SubmitMode,
    timeout_secs: Option<u64>,
}

pub fn load_config(explicit: Option<&Path>) -> Result<InsightsConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    };
    load_config_with_env(path.as_deref(), |key| std::env::var(key).ok())
}

pub(crate) fn load_config_with_env<F>(path: Option<&Path>, env: F) -> Result<InsightsConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut merged = defaults();
    if let Some(path) = path {
        if !path.exists() {
            return Err(InsightsError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        merge_toml(&mut merged, read_toml_value(path)?);
    }
    merge_toml(&mut merged, env_overlay(env));

    let partial: PartialConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| InsightsError::Config(e.to_string()))?;
    tracing::debug!(?partial, "merged configuration layers");

    Ok(InsightsConfig {
        base_url: partial.base_url,
        proxy_url: partial.proxy_url,
        repo_owner: required(partial.repo_owner, "repo_owner", "BITBUCKET_REPO_OWNER")?,
        repo_slug: required(partial.repo_slug, "repo_slug", "BITBUCKET_REPO_SLUG")?,
        commit: required(partial.commit, "commit", "BITBUCKET_COMMIT")?,
        clone_dir: partial
            .clone_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or(InsightsError::MissingSetting {
                key: "clone_dir",
                env: "BITBUCKET_CLONE_DIR",
            })?,
        submit_mode: partial.submit_mode,
        timeout_secs: partial.timeout_secs,
    })
}

pub fn render_config(config: &InsightsConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

fn required(value: Option<String>, key: &'static str, env: &'static str) -> Result<String> {
    value
        .filter(|value| !value.is_empty())
        .ok_or(InsightsError::MissingSetting { key, env })
}

fn defaults() -> Value {
    let mut table = Map::new();
    table.insert(
        "base_url".to_string(),
        Value::String(DEFAULT_BASE_URL.to_string()),
    );
    table.insert(
        "proxy_url".to_string(),
        Value::String(DEFAULT_PROXY_URL.to_string()),
    );
    Value::Table(table)
}

fn env_overlay<F>(env: F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    let mut table = Map::new();
    for (var, key) in ENV_KEYS {
        if let Some(value) = env(var) {
            table.insert((*key).to_string(), Value::String(value));
        }
    }
    Value::Table(table)
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| InsightsError::Config(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn ci_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("BITBUCKET_REPO_OWNER", "acme"),
            ("BITBUCKET_REPO_SLUG", "shop"),
            ("BITBUCKET_COMMIT", "abc123"),
            ("BITBUCKET_CLONE_DIR", "/opt/atlassian/pipelines/agent/build"),
        ])
    }

    #[test]
    fn environment_alone_is_enough() {
        let env = ci_env();
        let cfg = load_config_with_env(None, |key| env.get(key).map(|v| v.to_string()))
            .expect("config should load");

        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.proxy_url, DEFAULT_PROXY_URL);
        assert_eq!(cfg.repo_owner, "acme");
        assert_eq!(cfg.repo_slug, "shop");
        assert_eq!(cfg.commit, "abc123");
        assert_eq!(
            cfg.clone_dir,
            PathBuf::from("/opt/atlassian/pipelines/agent/build")
        );
        assert_eq!(cfg.submit_mode, SubmitMode::Single);
    }

    #[test]
    fn environment_overrides_file_and_file_overrides_defaults() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
base_url = "http://bitbucket.internal/2.0/"
repo_slug = "from-file"
submit_mode = "bulk"
timeout_secs = 15
"#,
        )
        .expect("config should write");

        let env = ci_env();
        let cfg = load_config_with_env(Some(&path), |key| env.get(key).map(|v| v.to_string()))
            .expect("config should load");

        assert_eq!(cfg.base_url, "http://bitbucket.internal/2.0/");
        assert_eq!(cfg.repo_slug, "shop");
        assert_eq!(cfg.submit_mode, SubmitMode::Bulk);
        assert_eq!(cfg.timeout_secs, Some(15));
    }

    #[test]
    fn missing_commit_names_its_variable() {
        let mut env = ci_env();
        env.remove("BITBUCKET_COMMIT");
        let err = load_config_with_env(None, |key| env.get(key).map(|v| v.to_string()))
            .expect_err("missing commit should fail");
        assert!(matches!(
            err,
            InsightsError::MissingSetting {
                env: "BITBUCKET_COMMIT",
                ..
            }
        ));
    }

    #[test]
    fn empty_variable_counts_as_missing() {
        let mut env = ci_env();
        env.insert("BITBUCKET_REPO_SLUG", "");
        let err = load_config_with_env(None, |key| env.get(key).map(|v| v.to_string()))
            .expect_err("empty slug should fail");
        assert!(err.to_string().contains("BITBUCKET_REPO_SLUG"));
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let dir = TempDir::new().expect("temp dir should be created");
        let missing = dir.path().join("nope.toml");
        let err = load_config_with_env(Some(&missing), |_| None)
            .expect_err("missing file should fail");
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn rendered_config_round_trips_through_toml() {
        let env = ci_env();
        let cfg = load_config_with_env(None, |key| env.get(key).map(|v| v.to_string()))
            .expect("config should load");
        let rendered = render_config(&cfg).expect("config should render");
        assert!(rendered.contains("repo_slug = \"shop\""));
        assert!(rendered.contains("submit_mode = \"single\""));
    }
}
