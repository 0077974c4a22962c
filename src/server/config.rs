//! Application settings loaded via OrthoConfig, and session key handling.

use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroize;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_PATH: &str = "telemetry.db";
const DEFAULT_BACKUP_DIR: &str = "backups";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// Minimum length accepted for the session-signing secret.
const MIN_SESSION_KEY_BYTES: usize = 64;

/// Settings controlling the listener, store, backups, and the admin gate.
///
/// Loaded from CLI flags, the environment (`TELEMETRY_*`), or a config
/// file, in that precedence order.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TELEMETRY")]
pub struct AppSettings {
    /// Listen port.
    pub port: Option<u16>,
    /// Listen address.
    pub bind_address: Option<String>,
    /// SQLite database file backing the store.
    pub database_path: Option<PathBuf>,
    /// Directory receiving snapshot files.
    pub backup_dir: Option<PathBuf>,
    /// Administrator username for the `/admin` surface.
    pub admin_username: Option<String>,
    /// Administrator password for the `/admin` surface.
    pub admin_password: Option<String>,
    /// File holding the session cookie signing secret (>= 64 bytes).
    pub session_key_file: Option<PathBuf>,
    /// Allow a generated throwaway session key when the key file is absent.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Set the `Secure` flag on the session cookie.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
}

impl AppSettings {
    /// Return the configured port, falling back to the default.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Return the configured bind address, falling back to the default.
    pub fn bind_address(&self) -> &str {
        self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS)
    }

    /// Return the configured database path, falling back to the default.
    pub fn database_path(&self) -> &Path {
        self.database_path
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_DATABASE_PATH))
    }

    /// Return the configured backup directory, falling back to the default.
    pub fn backup_dir(&self) -> &Path {
        self.backup_dir
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_BACKUP_DIR))
    }

    /// Return the configured admin username, falling back to the default.
    pub fn admin_username(&self) -> &str {
        self.admin_username
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_USERNAME)
    }

    /// Return the configured admin password, falling back to the default.
    pub fn admin_password(&self) -> &str {
        self.admin_password
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_PASSWORD)
    }

    /// Load the session signing key from the configured file.
    ///
    /// Falls back to a generated throwaway key in debug builds or when
    /// `session_allow_ephemeral` is set; release builds without a key file
    /// refuse to start.
    pub fn session_key(&self) -> std::io::Result<Key> {
        let Some(path) = &self.session_key_file else {
            return self.ephemeral_key("no session key file configured");
        };
        match std::fs::read(path) {
            Ok(mut bytes) => {
                if bytes.len() < MIN_SESSION_KEY_BYTES {
                    bytes.zeroize();
                    return Err(std::io::Error::other(format!(
                        "session key at {} must be at least {MIN_SESSION_KEY_BYTES} bytes",
                        path.display()
                    )));
                }
                let key = Key::derive_from(&bytes);
                bytes.zeroize();
                Ok(key)
            }
            Err(e) => self.ephemeral_key(&format!(
                "failed to read session key at {}: {e}",
                path.display()
            )),
        }
    }

    fn ephemeral_key(&self, reason: &str) -> std::io::Result<Key> {
        if cfg!(debug_assertions) || self.session_allow_ephemeral {
            warn!(reason, "using temporary session key (dev only)");
            Ok(Key::generate())
        } else {
            Err(std::io::Error::other(reason.to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and session key handling.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("telemetry-backend")])
            .expect("config should load")
    }

    fn clean_env() -> Vec<(&'static str, Option<String>)> {
        [
            "TELEMETRY_PORT",
            "TELEMETRY_BIND_ADDRESS",
            "TELEMETRY_DATABASE_PATH",
            "TELEMETRY_BACKUP_DIR",
            "TELEMETRY_ADMIN_USERNAME",
            "TELEMETRY_ADMIN_PASSWORD",
            "TELEMETRY_SESSION_KEY_FILE",
            "TELEMETRY_SESSION_ALLOW_EPHEMERAL",
            "TELEMETRY_COOKIE_SECURE",
        ]
        .into_iter()
        .map(|name| (name, None))
        .collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(clean_env());

        let settings = load_from_empty_args();
        assert_eq!(settings.port(), 8080);
        assert_eq!(settings.bind_address(), "0.0.0.0");
        assert_eq!(settings.database_path(), Path::new("telemetry.db"));
        assert_eq!(settings.backup_dir(), Path::new("backups"));
        assert_eq!(settings.admin_username(), "admin");
        assert!(settings.cookie_secure);
        assert!(!settings.session_allow_ephemeral);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut env = clean_env();
        for (name, value) in &mut env {
            *value = match *name {
                "TELEMETRY_PORT" => Some("9090".to_owned()),
                "TELEMETRY_DATABASE_PATH" => Some("/tmp/t.db".to_owned()),
                "TELEMETRY_ADMIN_USERNAME" => Some("ops".to_owned()),
                "TELEMETRY_ADMIN_PASSWORD" => Some("hunter2".to_owned()),
                _ => None,
            };
        }
        let _guard = lock_env(env);

        let settings = load_from_empty_args();
        assert_eq!(settings.port(), 9090);
        assert_eq!(settings.database_path(), Path::new("/tmp/t.db"));
        assert_eq!(settings.admin_username(), "ops");
        assert_eq!(settings.admin_password(), "hunter2");
    }

    #[rstest]
    fn short_session_key_is_rejected() {
        let _guard = lock_env(clean_env());
        let dir = tempfile::tempdir().expect("tempdir");
        let key_path = dir.path().join("session_key");
        std::fs::write(&key_path, b"too-short").expect("write key");

        let mut settings = load_from_empty_args();
        settings.session_key_file = Some(key_path);
        assert!(settings.session_key().is_err());
    }

    #[rstest]
    fn long_session_key_is_accepted() {
        let _guard = lock_env(clean_env());
        let dir = tempfile::tempdir().expect("tempdir");
        let key_path = dir.path().join("session_key");
        std::fs::write(&key_path, [7u8; 64]).expect("write key");

        let mut settings = load_from_empty_args();
        settings.session_key_file = Some(key_path);
        settings.session_key().expect("key derives");
    }
}
