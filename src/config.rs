/*
 * Responsibility
 * - 環境変数や CLI 引数からの設定読み込み (JWT 鍵、issuer/audience、TTL、ログ出力先など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Longest accepted credential lifetime (365 days).
pub const MAX_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Largest accepted clock-skew allowance (1 day).
pub const MAX_LEEWAY_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Command line flags. Anything not given here falls back to the environment.
#[derive(Debug, Default, Parser)]
#[command(name = "hello-starter", version, about = "Minimal axum web starter")]
pub struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Load environment variables from this file instead of `.env`
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

/// Settings for the signed credential (JWT).
///
/// `secret` is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audiences: Vec<String>,
    pub ttl_seconds: u64,
    pub leeway_seconds: u64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("audiences", &self.audiences)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub auth_name: String,
    pub flash_name: String,
    pub secure: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub request_timeout: Duration,
    pub jwt: JwtConfig,
    pub log: LogConfig,
    pub cookies: CookieConfig,
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        match &cli.env_file {
            Some(path) => {
                dotenvy::from_path(path).map_err(|_| ConfigError::Invalid("--env-file"))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }

        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        if let Some(port) = cli.port {
            config.addr.set_port(port);
        }
        Ok(config)
    }

    /// Build and validate the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            let value = lookup(key).ok_or(ConfigError::Missing(key))?;
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(key));
            }
            Ok(value)
        };

        let port: u16 = match lookup("PORT") {
            Some(s) => s.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECONDS") {
            Some(v) => match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS")),
            },
            None => Duration::from_secs(30),
        };

        let secret = required("JWT_SECRET")?;
        let issuer = required("JWT_ISSUER")?.trim().to_string();

        let audiences = required("JWT_AUDIENCE")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        if audiences.is_empty() {
            return Err(ConfigError::Invalid("JWT_AUDIENCE"));
        }

        let ttl_seconds =
            parse_ttl(&required("JWT_TTL")?).ok_or(ConfigError::Invalid("JWT_TTL"))?;

        let leeway_seconds = match lookup("JWT_LEEWAY_SECONDS") {
            Some(v) => match v.trim().parse::<u64>() {
                Ok(secs) if secs <= MAX_LEEWAY_SECONDS => secs,
                _ => return Err(ConfigError::Invalid("JWT_LEEWAY_SECONDS")),
            },
            None => 0,
        };

        let level = required("LOG_LEVEL")?.trim().to_string();
        if EnvFilter::try_new(&level).is_err() {
            return Err(ConfigError::Invalid("LOG_LEVEL"));
        }
        let log = LogConfig {
            level,
            dir: PathBuf::from(required("LOG_DIR")?.trim()),
        };

        let auth_name = cookie_name(lookup("AUTH_COOKIE_NAME"), "token")
            .ok_or(ConfigError::Invalid("AUTH_COOKIE_NAME"))?;
        let flash_name = cookie_name(lookup("FLASH_COOKIE_NAME"), "flash")
            .ok_or(ConfigError::Invalid("FLASH_COOKIE_NAME"))?;
        if auth_name == flash_name {
            return Err(ConfigError::Invalid("FLASH_COOKIE_NAME"));
        }
        let cookies = CookieConfig {
            auth_name,
            flash_name,
            secure: app_env.is_production(),
        };

        Ok(Self {
            addr,
            app_env,
            request_timeout,
            jwt: JwtConfig {
                secret,
                issuer,
                audiences,
                ttl_seconds,
                leeway_seconds,
            },
            log,
            cookies,
        })
    }
}

/// `None` when the configured value is not a usable cookie name.
fn cookie_name(raw: Option<String>, default: &str) -> Option<String> {
    let Some(raw) = raw else {
        return Some(default.to_string());
    };

    let name = raw.trim();
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?={}".contains(c));

    valid.then(|| name.to_string())
}

/// Parse a token lifetime such as `3600`, `90s`, `15m`, `1h` or `7d` into seconds.
///
/// Zero and anything above `MAX_TTL_SECONDS` are rejected.
pub fn parse_ttl(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);

    let amount: u64 = digits.parse().ok()?;
    let factor = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return None,
    };

    match amount.checked_mul(factor)? {
        0 => None,
        secs if secs > MAX_TTL_SECONDS => None,
        secs => Some(secs),
    }
}
