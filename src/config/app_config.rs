use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::probe_config::ProbeConfig;
use crate::dns::{DnsOptions, ResolverLabel};
use crate::error::ConfigError;
use crate::http_probe::probe::{HttpOptions, default_user_agent};
use crate::prompt::normalize_domain;

const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Static settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub domain: Option<String>,
    pub log_file: PathBuf,
    pub interval: Duration,
    pub dns_servers: Vec<IpAddr>,
    pub dns: DnsOptions,
    pub http: HttpOptions,
}

impl AppConfig {
    /// Resolver labels in probe order: configured servers, then the system resolver.
    pub fn resolver_labels(&self) -> Vec<ResolverLabel> {
        self.dns_servers
            .iter()
            .copied()
            .map(ResolverLabel::Nameserver)
            .chain(std::iter::once(ResolverLabel::System))
            .collect()
    }

    /// Combine the file configuration with environment overrides and validate.
    pub fn from_sources<F>(file: ProbeConfig, env_var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let domain = env_var("TARGET_DOMAIN").or(file.domain);
        let domain = match domain {
            Some(raw) => Some(
                normalize_domain(&raw).ok_or_else(|| ConfigError::InvalidDomain(raw.clone()))?,
            ),
            None => None,
        };

        let log_file = env_var("LOG_FILE").unwrap_or(file.log_file);

        let interval_ms = match env_var("PROBE_INTERVAL_MS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PROBE_INTERVAL_MS",
                value: raw.clone(),
            })?,
            None => file.interval_ms,
        };

        let dns_hosts: Vec<String> = match env_var("DNS_HOSTS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => file.dns_servers,
        };

        let dns_servers = dns_hosts
            .iter()
            .map(|host| {
                host.trim()
                    .parse::<IpAddr>()
                    .map_err(|_| ConfigError::InvalidDnsServer(host.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let config = AppConfig {
            domain,
            log_file: PathBuf::from(log_file),
            interval: non_zero_millis("interval_ms", interval_ms)?,
            dns_servers,
            dns: DnsOptions {
                timeout: non_zero_millis("dns_timeout_ms", file.dns_timeout_ms)?,
                disable_cache: file.disable_dns_cache,
                protocol: file.dns_protocol,
            },
            http: HttpOptions {
                connect_timeout: non_zero_millis(
                    "http_connect_timeout_ms",
                    file.http_connect_timeout_ms,
                )?,
                request_timeout: non_zero_millis("http_timeout_ms", file.http_timeout_ms)?,
                user_agent: file.user_agent.unwrap_or_else(default_user_agent),
            },
        };

        Ok(config)
    }
}

fn non_zero_millis(key: &'static str, value: u64) -> Result<Duration, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        });
    }
    Ok(Duration::from_millis(value))
}

fn read_probe_config(path: &Path) -> Result<ProbeConfig, ConfigError> {
    let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&config_str).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the application configuration from a YAML file and environment variables.
///
/// The file named by `CONFIG_FILE` must exist. Without it, `config.yml` is
/// read when present and built-in defaults are used otherwise. `TARGET_DOMAIN`,
/// `LOG_FILE`, `PROBE_INTERVAL_MS` and `DNS_HOSTS` override the file.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let file = match env::var("CONFIG_FILE") {
        Ok(location) => read_probe_config(Path::new(&location))?,
        Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            read_probe_config(Path::new(DEFAULT_CONFIG_FILE))?
        }
        Err(_) => {
            log::info!("No {DEFAULT_CONFIG_FILE} found, using defaults");
            ProbeConfig::default()
        }
    };

    let config = AppConfig::from_sources(file, |key| env::var(key).ok())?;
    log::info!("Using DNS hosts: {:?}", config.dns_servers);
    Ok(config)
}
