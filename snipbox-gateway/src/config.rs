//! Command line and environment configuration.
//!
//! The CLI picks an env file by deployment mode; the file is loaded into the
//! process environment with `dotenvy`, and [`GatewayConfig`] is then read
//! from environment variables.

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use clap::{Parser, ValueEnum};
use snipbox_core::Language;
use snipbox_executor::{ExecutorConfig, InterpreterCommand};
use snipbox_guard::LimiterConfig;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default upper bound on submitted code, in characters.
pub const DEFAULT_MAX_CODE_LEN: usize = 10_000;

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Local development, reads `.env.local`.
    #[default]
    Dev,
    /// Preview deployment, reads `.env.preview`.
    Preview,
    /// Production, reads `.env.prod`.
    Prod,
}

impl Mode {
    /// Env file loaded for this mode.
    #[must_use]
    pub const fn env_file(self) -> &'static str {
        match self {
            Mode::Dev => ".env.local",
            Mode::Preview => ".env.preview",
            Mode::Prod => ".env.prod",
        }
    }
}

/// Command line arguments for `snipbox-gateway`.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Deployment mode; selects the env file to load
    #[arg(long, value_enum, default_value_t = Mode::Dev, env = "SNIPBOX_MODE")]
    pub mode: Mode,

    /// Load this env file instead of the mode's default
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

impl Cli {
    /// The env file to load: `--env-file` if given, else the mode's file.
    #[must_use]
    pub fn env_file(&self) -> PathBuf {
        self.env_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.mode.env_file()))
    }
}

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A variable is set but cannot be used.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the gateway needs to start.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Port to bind.
    pub port: u16,
    /// Origin granted cross-origin access, if any.
    pub cors_origin: Option<HeaderValue>,
    /// Rate limiter tuning.
    pub limiter: LimiterConfig,
    /// Staging directories, interpreters and timeout.
    pub executor: ExecutorConfig,
    /// Maximum code length in characters.
    pub max_code_len: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cors_origin: None,
            limiter: LimiterConfig::default(),
            executor: ExecutorConfig::default(),
            max_code_len: DEFAULT_MAX_CODE_LEN,
        }
    }
}

impl GatewayConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for any malformed variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`. Unset and blank variables
    /// take their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for any malformed variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let host = parse(&var, "APP_HOST", defaults.host)?;
        let port = parse(&var, "APP_PORT", defaults.port)?;

        let cors_origin = match var("CORS_DOMAIN") {
            Some(value) => Some(
                HeaderValue::from_str(&value).map_err(|e| invalid("CORS_DOMAIN", value, e))?,
            ),
            None => None,
        };

        let limiter = LimiterConfig::new(
            positive_secs(&var, "RATE_LIMIT_WINDOW_SECS", defaults.limiter.window)?,
            parse(&var, "RATE_LIMIT_MAX_REQUESTS", defaults.limiter.max_requests)?,
        )
        .with_eviction(
            positive_secs(&var, "RATE_LIMIT_SWEEP_SECS", defaults.limiter.sweep_interval)?,
            positive_secs(&var, "RATE_LIMIT_INACTIVITY_SECS", defaults.limiter.inactivity)?,
        );

        let work_dir = var("WORK_DIR").map_or(defaults.executor.work_dir, PathBuf::from);
        let staging_dir = var("STAGING_DIR").map_or(defaults.executor.staging_dir, PathBuf::from);
        let mut executor = ExecutorConfig::new(work_dir, staging_dir).with_timeout(positive_secs(
            &var,
            "EXEC_TIMEOUT_SECS",
            defaults.executor.timeout,
        )?);
        for (key, language) in [
            ("NODE_BIN", Language::Node),
            ("PHP_BIN", Language::Php),
            ("GO_BIN", Language::Go),
        ] {
            if let Some(program) = var(key) {
                let mut command = InterpreterCommand::default_for(language);
                command.program = PathBuf::from(program);
                executor = executor.with_interpreter(language, command);
            }
        }

        let max_code_len = parse(&var, "MAX_CODE_LENGTH", defaults.max_code_len)?;
        if max_code_len == 0 {
            return Err(invalid("MAX_CODE_LENGTH", "0", "must be greater than zero"));
        }

        Ok(Self {
            host,
            port,
            cors_origin,
            limiter,
            executor,
            max_code_len,
        })
    }

    /// Socket address to bind.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn invalid(key: &'static str, value: impl Into<String>, reason: impl Display) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.into(),
        reason: reason.to_string(),
    }
}

fn parse<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value.parse().map_err(|e| invalid(key, value.as_str(), e)),
        None => Ok(default),
    }
}

fn positive_secs<F>(var: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse(var, key, default.as_secs())?;
    if secs == 0 {
        return Err(invalid(key, "0", "must be at least one second"));
    }
    Ok(Duration::from_secs(secs))
}
