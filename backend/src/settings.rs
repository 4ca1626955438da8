//! Startup configuration loaded via OrthoConfig.
//!
//! Values come from `ACCOUNTS_*` environment variables, a config file, or the
//! command line. They are read once in `main` and turned into immutable
//! values ([`ErrorPolicy`], bind address, session settings) before the
//! server starts.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::inbound::http::ErrorPolicy;

const DEFAULT_PORT: u16 = 8080;

/// Process configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACCOUNTS")]
pub struct AppSettings {
    /// Interface to bind; defaults to all IPv4 interfaces.
    pub host: Option<IpAddr>,
    /// TCP port; defaults to 8080.
    pub port: Option<u16>,
    /// PostgreSQL URL. Without it the service keeps users in memory.
    pub database_url: Option<String>,
    /// Include internal failure detail in error bodies; off by default.
    pub expose_error_detail: Option<bool>,
    /// File holding at least 64 bytes of session key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`; on by default.
    pub session_cookie_secure: Option<bool>,
    /// Permit a generated session key outside debug builds; off by default.
    pub session_allow_ephemeral: Option<bool>,
}

impl AppSettings {
    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Whether error bodies carry internal detail.
    pub fn expose_error_detail(&self) -> bool {
        self.expose_error_detail.unwrap_or(false)
    }

    /// Whether the session cookie is marked `Secure`.
    pub fn cookie_secure(&self) -> bool {
        self.session_cookie_secure.unwrap_or(true)
    }

    /// Whether a generated session key is acceptable in release builds.
    pub fn allow_ephemeral_key(&self) -> bool {
        self.session_allow_ephemeral.unwrap_or(false)
    }

    /// Error exposure policy fixed for the process lifetime.
    pub fn error_policy(&self) -> ErrorPolicy {
        if self.expose_error_detail() {
            ErrorPolicy::development()
        } else {
            ErrorPolicy::production()
        }
    }
}

#[cfg(test)]
mod tests {
    //! Environment parsing for startup settings.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "ACCOUNTS_HOST",
        "ACCOUNTS_PORT",
        "ACCOUNTS_DATABASE_URL",
        "ACCOUNTS_EXPOSE_ERROR_DETAIL",
        "ACCOUNTS_SESSION_KEY_FILE",
        "ACCOUNTS_SESSION_COOKIE_SECURE",
        "ACCOUNTS_SESSION_ALLOW_EPHEMERAL",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("accounts-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(settings.database_url.is_none());
        assert!(settings.cookie_secure());
        assert!(!settings.allow_ephemeral_key());
        assert!(!settings.expose_error_detail());
        assert_eq!(settings.error_policy(), ErrorPolicy::production());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ACCOUNTS_HOST", Some("127.0.0.1".to_owned())),
            ("ACCOUNTS_PORT", Some("9090".to_owned())),
            (
                "ACCOUNTS_DATABASE_URL",
                Some("postgres://localhost/accounts".to_owned()),
            ),
            ("ACCOUNTS_EXPOSE_ERROR_DETAIL", Some("true".to_owned())),
            ("ACCOUNTS_SESSION_KEY_FILE", Some("/run/key".to_owned())),
            ("ACCOUNTS_SESSION_COOKIE_SECURE", Some("false".to_owned())),
            ("ACCOUNTS_SESSION_ALLOW_EPHEMERAL", None),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), SocketAddr::from(([127, 0, 0, 1], 9090)));
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/accounts")
        );
        assert_eq!(settings.session_key_file, Some(PathBuf::from("/run/key")));
        assert!(!settings.cookie_secure());
        assert!(!settings.allow_ephemeral_key());
        assert_eq!(settings.error_policy(), ErrorPolicy::development());
    }

    #[rstest]
    #[case(Some("true"), Some("true"), true, true)]
    #[case(Some("false"), Some("false"), false, false)]
    #[case(None, Some("true"), true, true)]
    fn boolean_flags_follow_the_environment(
        #[case] secure: Option<&str>,
        #[case] ephemeral: Option<&str>,
        #[case] expected_secure: bool,
        #[case] expected_ephemeral: bool,
    ) {
        let _guard = lock_env([
            ("ACCOUNTS_SESSION_COOKIE_SECURE", secure.map(str::to_owned)),
            ("ACCOUNTS_SESSION_ALLOW_EPHEMERAL", ephemeral.map(str::to_owned)),
            ("ACCOUNTS_EXPOSE_ERROR_DETAIL", None),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.cookie_secure(), expected_secure);
        assert_eq!(settings.allow_ephemeral_key(), expected_ephemeral);
        assert_eq!(settings.error_policy(), ErrorPolicy::production());
    }
}
