use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::calendar::{
    AcademicCalendar, CalendarImportError, PoolRegistry, UncoveredTrainingType,
};
use crate::inscription::domain::Period;
use crate::inscription::resolver::{PoolResolver, ResolverSettings, ResolverVariant};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub admission: AdmissionSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            admission: AdmissionSettings::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Pool resolution knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionSettings {
    /// CSV overriding the generated calendar windows.
    pub calendar_csv: Option<PathBuf>,
    pub resolver_variant: ResolverVariant,
    /// Overrides the variant's own non-resident quota block when set.
    pub block_quota_non_resident: Option<bool>,
    pub medicine_dentistry_period: Option<Period>,
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        Self {
            calendar_csv: None,
            resolver_variant: ResolverVariant::Current,
            block_quota_non_resident: None,
            medicine_dentistry_period: None,
        }
    }
}

impl AdmissionSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let calendar_csv = non_empty_var("ADMISSION_CALENDAR_CSV").map(PathBuf::from);

        let resolver_variant = match non_empty_var("ADMISSION_RESOLVER_VARIANT") {
            Some(raw) => raw
                .parse::<ResolverVariant>()
                .map_err(ConfigError::InvalidResolverVariant)?,
            None => ResolverVariant::Current,
        };

        let block_quota_non_resident = non_empty_var("ADMISSION_BLOCK_QUOTA_NON_RESIDENT")
            .map(|raw| parse_bool("ADMISSION_BLOCK_QUOTA_NON_RESIDENT", &raw))
            .transpose()?;

        let start = non_empty_var("ADMISSION_MEDICINE_PERIOD_START")
            .map(|raw| parse_date("ADMISSION_MEDICINE_PERIOD_START", &raw))
            .transpose()?;
        let end = non_empty_var("ADMISSION_MEDICINE_PERIOD_END")
            .map(|raw| parse_date("ADMISSION_MEDICINE_PERIOD_END", &raw))
            .transpose()?;
        let medicine_dentistry_period = match (start, end) {
            (Some(start), Some(end)) if start <= end => Some(Period { start, end }),
            (None, None) => None,
            _ => return Err(ConfigError::InvalidMedicinePeriod),
        };

        Ok(Self {
            calendar_csv,
            resolver_variant,
            block_quota_non_resident,
            medicine_dentistry_period,
        })
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        let settings = ResolverSettings::for_variant(self.resolver_variant);
        match self.block_quota_non_resident {
            Some(block) => settings.with_quota_block(block),
            None => settings,
        }
    }

    /// Resolver over the variant's pools, refusing registries that leave a training type uncovered.
    pub fn build_resolver(&self) -> Result<PoolResolver, ConfigError> {
        let registry = PoolRegistry::for_variant(self.resolver_variant);
        registry.validate().map_err(ConfigError::UncoveredPools)?;
        Ok(PoolResolver::new(registry, self.resolver_settings()))
    }

    /// Generated calendar around `current_year`, overridden by the configured CSV if any.
    pub fn calendar(&self, current_year: i32) -> Result<AcademicCalendar, CalendarImportError> {
        let mut calendar = AcademicCalendar::generate(&PoolRegistry::standard(), current_year);
        if let Some(path) = &self.calendar_csv {
            calendar.merge(AcademicCalendar::from_path(path)?);
        }
        Ok(calendar)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: raw.to_string(),
        }),
    }
}

fn parse_date(var: &'static str, raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate {
        var,
        value: raw.to_string(),
    })
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidResolverVariant(String),
    InvalidBool { var: &'static str, value: String },
    InvalidDate { var: &'static str, value: String },
    InvalidMedicinePeriod,
    UncoveredPools(UncoveredTrainingType),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidResolverVariant(value) => write!(
                f,
                "ADMISSION_RESOLVER_VARIANT must be 'current' or 'legacy', got '{}'",
                value
            ),
            ConfigError::InvalidBool { var, value } => {
                write!(f, "{} must be a boolean, got '{}'", var, value)
            }
            ConfigError::InvalidDate { var, value } => {
                write!(f, "{} must be a YYYY-MM-DD date, got '{}'", var, value)
            }
            ConfigError::InvalidMedicinePeriod => write!(
                f,
                "ADMISSION_MEDICINE_PERIOD_START and ADMISSION_MEDICINE_PERIOD_END must both be set, start first"
            ),
            ConfigError::UncoveredPools(err) => write!(f, "invalid pool registry: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::UncoveredPools(err) => Some(err),
            ConfigError::InvalidPort
            | ConfigError::InvalidResolverVariant(_)
            | ConfigError::InvalidBool { .. }
            | ConfigError::InvalidDate { .. }
            | ConfigError::InvalidMedicinePeriod => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for var in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "ADMISSION_CALENDAR_CSV",
            "ADMISSION_RESOLVER_VARIANT",
            "ADMISSION_BLOCK_QUOTA_NON_RESIDENT",
            "ADMISSION_MEDICINE_PERIOD_START",
            "ADMISSION_MEDICINE_PERIOD_END",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.admission, AdmissionSettings::default());
        assert_eq!(config.admission.resolver_settings(), ResolverSettings::current());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn legacy_variant_drops_quota_block_unless_forced() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADMISSION_RESOLVER_VARIANT", "Legacy");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.admission.resolver_settings(), ResolverSettings::legacy());
        assert!(!config.admission.resolver_settings().block_quota_non_resident);
        let resolver = config.admission.build_resolver().expect("legacy registry is complete");
        assert!(resolver.registry().priority_pools().is_empty());

        env::set_var("ADMISSION_BLOCK_QUOTA_NON_RESIDENT", "true");
        let config = AppConfig::load().expect("config loads");
        let settings = config.admission.resolver_settings();
        assert!(!settings.assimilation_in_ue_plus_5);
        assert!(!settings.specific_period_check);
        assert!(settings.block_quota_non_resident);
        reset_env();
    }

    #[test]
    fn rejects_half_configured_medicine_period() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADMISSION_MEDICINE_PERIOD_START", "2024-07-01");
        match AppConfig::load() {
            Err(ConfigError::InvalidMedicinePeriod) => {}
            other => panic!("expected invalid medicine period, got {other:?}"),
        }

        env::set_var("ADMISSION_MEDICINE_PERIOD_END", "2024-09-30");
        let config = AppConfig::load().expect("config loads");
        let period = config
            .admission
            .medicine_dentistry_period
            .expect("period configured");
        assert_eq!(period.start, NaiveDate::from_ymd_opt(2024, 7, 1).expect("valid"));
        reset_env();
    }

    #[test]
    fn rejects_unknown_variant() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADMISSION_RESOLVER_VARIANT", "experimental");
        match AppConfig::load() {
            Err(ConfigError::InvalidResolverVariant(value)) => assert_eq!(value, "experimental"),
            other => panic!("expected invalid variant, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn build_resolver_validates_registry() {
        let resolver = AdmissionSettings::default()
            .build_resolver()
            .expect("standard registry covers every training type");
        assert_eq!(resolver.settings(), ResolverSettings::current());
    }
}
