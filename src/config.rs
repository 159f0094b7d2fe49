use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

const APP_DIR: &str = "ainotepad";
const CONFIG_FILE: &str = "config.json";

pub(crate) const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub(crate) const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub(crate) const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// On-disk shape of `config.json`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConfigFile {
    #[serde(default)]
    pub(crate) model: Option<String>,
    #[serde(default)]
    pub(crate) endpoint: Option<String>,
    #[serde(default)]
    pub(crate) api_key_env: Option<String>,
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

/// Resolved settings for the completion client, fixed at startup.
#[derive(Debug, Clone)]
pub(crate) struct AiConfig {
    pub(crate) model: String,
    pub(crate) endpoint: Url,
    pub(crate) api_key: Option<String>,
    pub(crate) timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: default_endpoint(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
}

pub(crate) fn config_dir() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join(APP_DIR));
    }
    if let Ok(appdata) = std::env::var("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join(APP_DIR));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join(APP_DIR))
}

pub(crate) fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

pub(crate) fn read_config_file(path: &Path) -> ConfigFile {
    let Ok(raw) = fs::read_to_string(path) else {
        return ConfigFile::default();
    };
    match serde_json::from_str::<ConfigFile>(&raw) {
        Ok(file) => file,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "ignoring invalid config file");
            ConfigFile::default()
        }
    }
}

/// Merges the file settings over the defaults and reads the credential from
/// the environment variable named by `api_key_env`.
pub(crate) fn resolve_ai_config(
    file: ConfigFile,
    lookup_env: impl Fn(&str) -> Option<String>,
) -> AiConfig {
    let mut config = AiConfig::default();
    if let Some(model) = file.model.filter(|m| !m.trim().is_empty()) {
        config.model = model.trim().to_string();
    }
    if let Some(raw) = file.endpoint {
        match Url::parse(raw.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => config.endpoint = url,
            Ok(url) => {
                tracing::warn!(endpoint = %url, "unsupported endpoint scheme; using default");
            }
            Err(err) => {
                tracing::warn!(endpoint = raw.as_str(), %err, "invalid endpoint; using default");
            }
        }
    }
    if let Some(secs) = file.timeout_secs.filter(|s| *s > 0) {
        config.timeout = Duration::from_secs(secs);
    }
    let key_env = file
        .api_key_env
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());
    config.api_key = lookup_env(key_env.trim()).filter(|key| !key.trim().is_empty());
    if config.api_key.is_none() {
        tracing::info!(env = key_env.as_str(), "no API key in environment");
    }
    config
}

pub(crate) fn load_ai_config() -> AiConfig {
    let file = config_file_path()
        .map(|path| read_config_file(&path))
        .unwrap_or_default();
    resolve_ai_config(file, |name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_when_file_is_empty() {
        let config = resolve_ai_config(ConfigFile::default(), no_env);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_reads_key_from_named_env_var() {
        let file = ConfigFile {
            api_key_env: Some("MY_KEY".to_string()),
            ..ConfigFile::default()
        };
        let config = resolve_ai_config(file, |name| {
            (name == "MY_KEY").then(|| "sk-test".to_string())
        });
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = resolve_ai_config(ConfigFile::default(), |_| Some("   ".to_string()));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_endpoint_falls_back_to_default() {
        let file = ConfigFile {
            endpoint: Some("not a url".to_string()),
            ..ConfigFile::default()
        };
        let config = resolve_ai_config(file, no_env);
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);

        let file = ConfigFile {
            endpoint: Some("ftp://example.com/chat".to_string()),
            ..ConfigFile::default()
        };
        let config = resolve_ai_config(file, no_env);
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_file_overrides_are_applied() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{"model": "gpt-4o-mini", "endpoint": "http://localhost:8080/v1/chat/completions", "timeout_secs": 5}"#,
        )
        .expect("write");
        let config = resolve_ai_config(read_config_file(&path), no_env);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(
            config.endpoint.as_str(),
            "http://localhost:8080/v1/chat/completions"
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").expect("write");
        let file = read_config_file(&path);
        assert!(file.model.is_none());
        assert!(file.endpoint.is_none());
    }
}
