//! Service configuration
//!
//! Every setting is a command-line flag that falls back to an environment
//! variable. `main` loads a `.env` file first, so deployments can keep the
//! variables there.

use std::time::Duration;

use clap::Parser;
use songlib_common::db::DbSettings;
use songlib_common::{Error, Result};

/// Command-line arguments for songlib-api
#[derive(Parser, Debug, Clone)]
#[command(name = "songlib-api")]
#[command(about = "Song library HTTP service")]
#[command(version)]
pub struct Args {
    /// Database host
    #[arg(long, env = "POSTGRES_HOST")]
    pub db_host: String,

    /// Database port
    #[arg(long, default_value = "5432", env = "POSTGRES_PORT")]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "POSTGRES_USER")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "POSTGRES_PASSWORD", hide_env_values = true)]
    pub db_password: String,

    /// Database name
    #[arg(long, env = "POSTGRES_DB")]
    pub db_name: String,

    /// Maximum pooled database connections
    #[arg(long, default_value = "10", env = "POSTGRES_MAX_CONNECTIONS")]
    pub db_max_connections: u32,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "APP_PORT")]
    pub port: u16,

    /// Base URL of the song metadata service
    #[arg(long, env = "EXTERNAL_API_URL")]
    pub external_api_url: Option<String>,

    /// Timeout for one metadata lookup, in seconds
    #[arg(long, default_value = "10", env = "EXTERNAL_API_TIMEOUT_SECS")]
    pub external_api_timeout_secs: u64,

    /// "debug" raises the default log level; RUST_LOG still wins
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Settings for the external metadata lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalApiSettings {
    /// Base URL without trailing slash; `None` disables lookups
    pub base_url: Option<String>,
    pub timeout: Duration,
}

/// Validated, read-only settings shared by the whole service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db: DbSettings,
    pub port: u16,
    pub external_api: ExternalApiSettings,
}

impl Settings {
    pub fn from_args(args: Args) -> Result<Self> {
        if args.db_max_connections == 0 {
            return Err(Error::Config(
                "POSTGRES_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        if args.external_api_timeout_secs == 0 {
            return Err(Error::Config(
                "EXTERNAL_API_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        let base_url = args
            .external_api_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        if let Some(url) = &base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "EXTERNAL_API_URL must be an http(s) URL, got {}",
                    url
                )));
            }
        }

        Ok(Self {
            db: DbSettings {
                host: args.db_host,
                port: args.db_port,
                user: args.db_user,
                password: args.db_password,
                name: args.db_name,
                max_connections: args.db_max_connections,
            },
            port: args.port,
            external_api: ExternalApiSettings {
                base_url,
                timeout: Duration::from_secs(args.external_api_timeout_secs),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const ENV_KEYS: &[&str] = &[
        "POSTGRES_HOST",
        "POSTGRES_PORT",
        "POSTGRES_USER",
        "POSTGRES_PASSWORD",
        "POSTGRES_DB",
        "POSTGRES_MAX_CONNECTIONS",
        "APP_PORT",
        "EXTERNAL_API_URL",
        "EXTERNAL_API_TIMEOUT_SECS",
        "LOG_LEVEL",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    fn required_flags() -> Vec<&'static str> {
        vec![
            "songlib-api",
            "--db-host",
            "localhost",
            "--db-user",
            "songs",
            "--db-password",
            "secret",
            "--db-name",
            "library",
        ]
    }

    #[test]
    #[serial]
    fn test_defaults_applied() {
        clear_env();
        let args = Args::try_parse_from(required_flags()).unwrap();
        let settings = Settings::from_args(args).unwrap();

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.db.port, 5432);
        assert_eq!(settings.db.max_connections, 10);
        assert_eq!(settings.external_api.base_url, None);
        assert_eq!(settings.external_api.timeout, Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn test_missing_required_database_field_fails() {
        clear_env();
        let result = Args::try_parse_from(["songlib-api", "--db-host", "localhost"]);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_values_read_from_environment() {
        clear_env();
        env::set_var("POSTGRES_HOST", "db");
        env::set_var("POSTGRES_PORT", "6543");
        env::set_var("POSTGRES_USER", "app");
        env::set_var("POSTGRES_PASSWORD", "pw");
        env::set_var("POSTGRES_DB", "music");
        env::set_var("APP_PORT", "9000");
        env::set_var("EXTERNAL_API_URL", "http://info.local/");

        let args = Args::try_parse_from(["songlib-api"]).unwrap();
        let settings = Settings::from_args(args).unwrap();
        clear_env();

        assert_eq!(settings.db.host, "db");
        assert_eq!(settings.db.port, 6543);
        assert_eq!(settings.db.user, "app");
        assert_eq!(settings.db.password, "pw");
        assert_eq!(settings.db.name, "music");
        assert_eq!(settings.port, 9000);
        assert_eq!(
            settings.external_api.base_url.as_deref(),
            Some("http://info.local")
        );
    }

    #[test]
    #[serial]
    fn test_blank_external_url_treated_as_absent() {
        clear_env();
        let mut flags = required_flags();
        flags.extend(["--external-api-url", "  "]);
        let settings = Settings::from_args(Args::try_parse_from(flags).unwrap()).unwrap();
        assert_eq!(settings.external_api.base_url, None);
    }

    #[test]
    #[serial]
    fn test_non_http_external_url_rejected() {
        clear_env();
        let mut flags = required_flags();
        flags.extend(["--external-api-url", "ftp://info.local"]);
        let result = Settings::from_args(Args::try_parse_from(flags).unwrap());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_zero_pool_size_rejected() {
        clear_env();
        let mut flags = required_flags();
        flags.extend(["--db-max-connections", "0"]);
        let result = Settings::from_args(Args::try_parse_from(flags).unwrap());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
