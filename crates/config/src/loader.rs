use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::schema::PetrelConfig;

/// Standard config file name.
const CONFIG_FILENAME: &str = "petrel.toml";

/// Load config from the given path.
pub fn load_config(path: &Path) -> anyhow::Result<PetrelConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_with(&raw, |name| std::env::var(name).ok());
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
}

/// Discover and load config from standard locations.
///
/// Search order: `./petrel.toml`, then `~/.config/petrel/petrel.toml`.
/// A missing or broken config falls back to defaults with a warning; the
/// gateway must come up regardless.
#[must_use]
pub fn discover_and_load() -> PetrelConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return apply_env_overrides(cfg),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    apply_env_overrides(PetrelConfig::default())
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }
    directories::ProjectDirs::from("", "", "petrel")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
        .filter(|path| path.exists())
}

/// Apply `PETREL_*` environment overrides on top of loaded values.
#[must_use]
pub fn apply_env_overrides(config: PetrelConfig) -> PetrelConfig {
    apply_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_overrides_with(
    mut config: PetrelConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> PetrelConfig {
    if let Some(bind) = lookup("PETREL_BIND") {
        config.server.bind = bind;
    }
    if let Some(port) = lookup("PETREL_PORT") {
        match port.parse() {
            Ok(parsed) => config.server.port = parsed,
            Err(_) => warn!(value = %port, "ignoring non-numeric PETREL_PORT"),
        }
    }
    if let Some(url) = lookup("PETREL_SERVICE_URL") {
        config.chat.service_url = url;
    }
    if let Some(did) = lookup("PETREL_CHAT_SERVICE") {
        config.chat.chat_service = did;
    }
    if let Some(secs) = lookup("PETREL_REQUEST_TIMEOUT_SECS") {
        match secs.parse() {
            Ok(parsed) => config.chat.request_timeout_secs = parsed,
            Err(_) => warn!(value = %secs, "ignoring non-numeric PETREL_REQUEST_TIMEOUT_SECS"),
        }
    }
    config
}

/// Substitute `${ENV_VAR}` references in raw config text. Unset variables
/// are left in place so parse errors point at the real problem.
fn substitute_with(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            },
        }
    }
    out.push_str(rest);
    out
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_config_is_empty() {
        let config: PetrelConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.chat.service_url, "https://bsky.social");
        assert_eq!(config.chat.chat_service, "did:web:api.bsky.chat#bsky_chat");
        assert_eq!(config.chat.request_timeout_secs, 30);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config: PetrelConfig = toml::from_str(
            "[server]\nport = 9000\n\n[chat]\nservice_url = \"https://pds.example.com\"\n",
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.chat.service_url, "https://pds.example.com");
        assert_eq!(config.chat.request_timeout_secs, 30);
    }

    #[test]
    fn substitution_replaces_known_variables() {
        let out = substitute_with("service_url = \"${PDS_URL}\"", |name| {
            (name == "PDS_URL").then(|| "https://sub.example.com".to_owned())
        });
        assert_eq!(out, "service_url = \"https://sub.example.com\"");
    }

    #[test]
    fn substitution_leaves_unknown_variables() {
        let raw = "value = \"${UNSET_VARIABLE}\"";
        assert_eq!(substitute_with(raw, |_| None), raw);
    }

    #[test]
    fn substitution_leaves_unterminated_reference() {
        let raw = "value = \"${BROKEN";
        assert_eq!(substitute_with(raw, |_| None), raw);
    }

    #[test]
    fn substitution_handles_multiple_references() {
        let out = substitute_with("${A}-${B}", |name| Some(name.to_lowercase()));
        assert_eq!(out, "a-b");
    }

    #[test]
    fn overrides_take_precedence() {
        let config = apply_overrides_with(PetrelConfig::default(), |name| match name {
            "PETREL_PORT" => Some("9999".into()),
            "PETREL_SERVICE_URL" => Some("https://override.example.com".into()),
            _ => None,
        });
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.chat.service_url, "https://override.example.com");
        assert_eq!(config.server.bind, "127.0.0.1");
    }

    #[test]
    fn non_numeric_port_override_is_ignored() {
        let config = apply_overrides_with(PetrelConfig::default(), |name| {
            (name == "PETREL_PORT").then(|| "not-a-port".to_owned())
        });
        assert_eq!(config.server.port, 8787);
    }

    #[test]
    fn request_timeout_converts_to_duration() {
        let config = PetrelConfig::default();
        assert_eq!(
            config.chat.request_timeout(),
            std::time::Duration::from_secs(30)
        );
    }
}
