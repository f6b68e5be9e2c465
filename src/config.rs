use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::mastodon;

const DEFAULT_ENV_PREFIX: &str = "PERCH";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub mastodon: MastodonConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MastodonConfig {
    #[serde(default = "default_instance_url")]
    pub instance_url: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for MastodonConfig {
    fn default() -> Self {
        Self {
            instance_url: default_instance_url(),
            access_token: String::new(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_instance_url() -> String {
    mastodon::DEFAULT_INSTANCE.to_string()
}

fn default_user_agent() -> String {
    format!("perch/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionsConfig {
    /// Action taken on Enter when no `-e` flag is given.
    #[serde(default = "default_action")]
    pub default_action: String,
    /// Editor launched on the downloaded file by the download-edit action.
    #[serde(default = "default_editor")]
    pub editor: String,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            default_action: default_action(),
            editor: default_editor(),
        }
    }
}

fn default_action() -> String {
    "browser".into()
}

fn default_editor() -> String {
    "gvim".into()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        if path.exists() {
            let from_file = read_config_file(path)?;
            cfg = merge_config(cfg, from_file);
        }
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    cfg = merge_config(cfg, load_env(prefix));

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if !other.mastodon.instance_url.is_empty() {
        base.mastodon.instance_url = other.mastodon.instance_url;
    }
    if !other.mastodon.access_token.is_empty() {
        base.mastodon.access_token = other.mastodon.access_token;
    }
    if !other.mastodon.user_agent.is_empty() {
        base.mastodon.user_agent = other.mastodon.user_agent;
    }
    if !other.actions.default_action.is_empty() {
        base.actions.default_action = other.actions.default_action;
    }
    if !other.actions.editor.is_empty() {
        base.actions.editor = other.actions.editor;
    }
    base
}

// Environment overrides start from all-empty fields so that unset
// variables never clobber values loaded from the file.
fn load_env(prefix: &str) -> Config {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    let mut cfg = empty_config();
    for (key, value) in map {
        apply_env_value(&mut cfg, &key, value);
    }
    cfg
}

fn empty_config() -> Config {
    Config {
        mastodon: MastodonConfig {
            instance_url: String::new(),
            access_token: String::new(),
            user_agent: String::new(),
        },
        actions: ActionsConfig {
            default_action: String::new(),
            editor: String::new(),
        },
    }
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "mastodon.instance_url" => cfg.mastodon.instance_url = value,
        "mastodon.access_token" => cfg.mastodon.access_token = value,
        "mastodon.user_agent" => cfg.mastodon.user_agent = value,
        "actions.default_action" => cfg.actions.default_action = value,
        "actions.editor" => cfg.actions.editor = value,
        _ => {}
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("perch").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_defaults_without_a_file() {
        let dir = tempdir().unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(dir.path().join("missing.yaml")),
            env_prefix: Some("PERCH_TEST_NONE".into()),
        })
        .unwrap();
        assert_eq!(cfg.mastodon.instance_url, mastodon::DEFAULT_INSTANCE);
        assert_eq!(cfg.actions.default_action, "browser");
        assert_eq!(cfg.actions.editor, "gvim");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "mastodon:\n  access_token: secret\nactions:\n  default_action: copy\n",
        )
        .unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(path),
            env_prefix: Some("PERCH_TEST_NONE".into()),
        })
        .unwrap();
        assert_eq!(cfg.mastodon.access_token, "secret");
        assert_eq!(cfg.actions.default_action, "copy");
        // Untouched fields keep their defaults.
        assert_eq!(cfg.mastodon.instance_url, mastodon::DEFAULT_INSTANCE);
    }

    #[test]
    fn env_overrides_file_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "actions:\n  editor: nano\n").unwrap();

        env::set_var("PERCH_TEST_ENV_ACTIONS__EDITOR", "hx");
        let cfg = load(LoadOptions {
            config_file: Some(path),
            env_prefix: Some("perch_test_env".into()),
        })
        .unwrap();
        env::remove_var("PERCH_TEST_ENV_ACTIONS__EDITOR");

        assert_eq!(cfg.actions.editor, "hx");
    }
}
