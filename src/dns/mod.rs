pub mod timer;

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use serde::Deserialize;

pub mod prelude {
    pub use super::timer::ResolverTimer;
    pub use super::{DnsFailure, DnsOptions, DnsOutcome, DnsProtocol, DnsTiming, ResolverLabel};
}

/// Text written in place of the resolver address for the host's own resolver.
pub const SYSTEM_DEFAULT_LABEL: &str = "System Default";

/// Text written in place of the resolved address when resolution fails.
/// The failure description follows it in parentheses.
pub const FAILED_ADDRESS: &str = "N/A";

/// Identifies which resolver a probe is made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverLabel {
    /// The operating system resolver.
    System,
    /// A specific DNS server, queried directly on port 53.
    Nameserver(IpAddr),
}

impl fmt::Display for ResolverLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverLabel::System => f.write_str(SYSTEM_DEFAULT_LABEL),
            ResolverLabel::Nameserver(ip) => write!(f, "{ip}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsProtocol {
    #[default]
    Udp,
    Tcp,
}

/// Per-lookup resolver settings, passed explicitly to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnsOptions {
    /// Upper bound for a single lookup, enforced around the whole call.
    pub timeout: Duration,
    /// When set, direct nameserver lookups run with a zero-sized answer cache.
    pub disable_cache: bool,
    pub protocol: DnsProtocol,
}

impl Default for DnsOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            disable_cache: true,
            protocol: DnsProtocol::Udp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsFailure {
    Timeout,
    NoAddress,
    Lookup(String),
}

impl fmt::Display for DnsFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsFailure::Timeout => f.write_str("DNS timeout"),
            DnsFailure::NoAddress => f.write_str("no address returned"),
            // `|` separates log fields.
            DnsFailure::Lookup(msg) => write!(f, "DNS error: {}", msg.replace('|', "/")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsOutcome {
    Resolved(IpAddr),
    Failed(DnsFailure),
}

impl DnsOutcome {
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            DnsOutcome::Resolved(ip) => Some(*ip),
            DnsOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DnsOutcome::Failed(_))
    }
}

impl fmt::Display for DnsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsOutcome::Resolved(ip) => write!(f, "{ip}"),
            DnsOutcome::Failed(failure) => write!(f, "{FAILED_ADDRESS} ({failure})"),
        }
    }
}

/// Result of one timed lookup. `elapsed` is reported for failures too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsTiming {
    pub outcome: DnsOutcome,
    pub elapsed: Duration,
}
