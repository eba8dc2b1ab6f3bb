use serde::Deserialize;

use crate::dns::DnsProtocol;

/// The probe configuration as read from the YAML file.
/// Every key is optional; missing keys fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    /// The domain to monitor. When absent the user is prompted for it.
    #[serde(default)]
    pub domain: Option<String>,

    /// File the probe records are appended to.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Delay between two full sweeps over the resolvers, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// DNS servers probed, in order, before the system resolver.
    #[serde(default = "default_dns_servers")]
    pub dns_servers: Vec<String>,

    #[serde(default)]
    pub dns_protocol: DnsProtocol,

    /// Run direct nameserver lookups without an answer cache.
    #[serde(default = "default_true")]
    pub disable_dns_cache: bool,

    #[serde(default = "default_dns_timeout_ms")]
    pub dns_timeout_ms: u64,

    #[serde(default = "default_http_connect_timeout_ms")]
    pub http_connect_timeout_ms: u64,

    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            domain: None,
            log_file: default_log_file(),
            interval_ms: default_interval_ms(),
            dns_servers: default_dns_servers(),
            dns_protocol: DnsProtocol::default(),
            disable_dns_cache: default_true(),
            dns_timeout_ms: default_dns_timeout_ms(),
            http_connect_timeout_ms: default_http_connect_timeout_ms(),
            http_timeout_ms: default_http_timeout_ms(),
            user_agent: None,
        }
    }
}

fn default_log_file() -> String {
    "domain_monitor.log".to_string()
}

fn default_interval_ms() -> u64 {
    5000
}

fn default_dns_servers() -> Vec<String> {
    vec!["1.1.1.1".to_string(), "8.8.8.8".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_dns_timeout_ms() -> u64 {
    3000
}

fn default_http_connect_timeout_ms() -> u64 {
    3000
}

fn default_http_timeout_ms() -> u64 {
    5000
}
