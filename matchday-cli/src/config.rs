//! Client configuration: embedded defaults merged with a user override file.

use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    connection: ConnectionConfig,
    #[serde(default)]
    runtime: RuntimeConfig,
}

#[derive(Deserialize, Default)]
struct ConnectionConfig {
    accept_version: Option<String>,
    vhost: Option<String>,
}

#[derive(Deserialize, Default)]
struct RuntimeConfig {
    verbose: Option<bool>,
}

pub struct Config {
    connection: ConnectionConfig,
    runtime: RuntimeConfig,
}

impl Config {
    pub fn load() -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_connection(&mut base.connection, user.connection);
                            merge_runtime(&mut base.runtime, user.runtime);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            connection: base.connection,
            runtime: base.runtime,
        }
    }

    /// Protocol version offered in the connection request.
    pub fn accept_version(&self) -> &str {
        self.connection.accept_version.as_deref().unwrap_or("1.2")
    }

    /// Virtual host override for the connection request, if configured.
    pub fn vhost(&self) -> Option<&str> {
        self.connection
            .vhost
            .as_deref()
            .filter(|v| !v.is_empty())
    }

    pub fn verbose(&self) -> bool {
        self.runtime.verbose.unwrap_or(false)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("matchday").join("config.toml"))
}

fn merge_connection(base: &mut ConnectionConfig, user: ConnectionConfig) {
    if user.accept_version.is_some() {
        base.accept_version = user.accept_version;
    }
    if user.vhost.is_some() {
        base.vhost = user.vhost;
    }
}

fn merge_runtime(base: &mut RuntimeConfig, user: RuntimeConfig) {
    if user.verbose.is_some() {
        base.verbose = user.verbose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let parsed: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed.connection.accept_version.as_deref(), Some("1.2"));
        assert_eq!(parsed.connection.vhost.as_deref(), Some(""));
        assert_eq!(parsed.runtime.verbose, Some(false));
    }

    #[test]
    fn user_values_override_defaults() {
        let mut base: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap();
        let user: ConfigFile =
            toml::from_str("[connection]\nvhost = \"stomp.example.org\"\n").unwrap();
        merge_connection(&mut base.connection, user.connection);
        merge_runtime(&mut base.runtime, user.runtime);

        assert_eq!(base.connection.vhost.as_deref(), Some("stomp.example.org"));
        // Untouched keys keep their defaults.
        assert_eq!(base.connection.accept_version.as_deref(), Some("1.2"));
    }
}
