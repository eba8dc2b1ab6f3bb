use std::net::IpAddr;
use std::time::Instant;

use tokio::net::lookup_host;
use tokio::time::timeout;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
};

use super::prelude::*;
use crate::http_probe::report;
use crate::probe::TimedLookup;

const DNS_PORT: u16 = 53;
const HTTPS_PORT: u16 = 443;

/// Times a single name resolution against a resolver label.
///
/// Nameserver labels are queried directly with a resolver built for that one
/// lookup, so no connection or answer cache carries over between probes.
/// The system label goes through the operating system resolver, whose own
/// caching cannot be controlled from here.
#[derive(Debug, Clone)]
pub struct ResolverTimer {
    options: DnsOptions,
}

impl ResolverTimer {
    pub fn new(options: DnsOptions) -> Self {
        Self { options }
    }

    pub async fn measure(&self, domain: &str, label: ResolverLabel) -> DnsTiming {
        match label {
            ResolverLabel::System => self.measure_system(domain).await,
            ResolverLabel::Nameserver(ip) => self.measure_nameserver(domain, ip).await,
        }
    }

    async fn measure_system(&self, domain: &str) -> DnsTiming {
        let start = Instant::now();
        let result = timeout(self.options.timeout, lookup_host((domain, HTTPS_PORT))).await;
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(Ok(mut addrs)) => match addrs.next() {
                Some(addr) => DnsOutcome::Resolved(addr.ip()),
                None => DnsOutcome::Failed(DnsFailure::NoAddress),
            },
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::TimedOut => {
                DnsOutcome::Failed(DnsFailure::Timeout)
            }
            Ok(Err(e)) => DnsOutcome::Failed(DnsFailure::Lookup(report(&e))),
            Err(_) => DnsOutcome::Failed(DnsFailure::Timeout),
        };

        DnsTiming { outcome, elapsed }
    }

    async fn measure_nameserver(&self, domain: &str, nameserver: IpAddr) -> DnsTiming {
        let resolver = self.build_resolver(nameserver);

        let start = Instant::now();
        let result = timeout(self.options.timeout, resolver.lookup_ip(domain)).await;
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(Ok(lookup)) => match lookup.iter().next() {
                Some(ip) => DnsOutcome::Resolved(ip),
                None => DnsOutcome::Failed(DnsFailure::NoAddress),
            },
            Ok(Err(e)) => DnsOutcome::Failed(classify_resolve_error(&e)),
            Err(_) => DnsOutcome::Failed(DnsFailure::Timeout),
        };

        DnsTiming { outcome, elapsed }
    }

    /// Build a resolver that talks to exactly one nameserver.
    /// The outer `timeout` bounds the call, so a single attempt is made.
    fn build_resolver(&self, nameserver: IpAddr) -> TokioAsyncResolver {
        let mut opts = ResolverOpts::default();
        opts.attempts = 1;
        opts.timeout = self.options.timeout;
        opts.use_hosts_file = false;
        if self.options.disable_cache {
            opts.cache_size = 0;
        }

        let protocol = match self.options.protocol {
            DnsProtocol::Udp => Protocol::Udp,
            DnsProtocol::Tcp => Protocol::Tcp,
        };

        let mut name_servers = NameServerConfigGroup::new();
        name_servers.push(NameServerConfig {
            socket_addr: (nameserver, DNS_PORT).into(),
            protocol,
            tls_dns_name: None,
            trust_negative_responses: false,
            bind_addr: None,
        });

        let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
        TokioAsyncResolver::tokio(resolver_config, opts)
    }
}

impl TimedLookup for ResolverTimer {
    async fn lookup(&self, domain: &str, label: ResolverLabel) -> DnsTiming {
        self.measure(domain, label).await
    }
}

fn classify_resolve_error(err: &ResolveError) -> DnsFailure {
    match err.kind() {
        ResolveErrorKind::Timeout => DnsFailure::Timeout,
        ResolveErrorKind::NoRecordsFound { .. } => DnsFailure::NoAddress,
        _ => DnsFailure::Lookup(report(err)),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn short_options() -> DnsOptions {
        DnsOptions {
            timeout: Duration::from_millis(300),
            ..DnsOptions::default()
        }
    }

    #[tokio::test]
    async fn test_system_resolver_resolves_localhost() {
        let timer = ResolverTimer::new(DnsOptions::default());
        let timing = timer.measure("localhost", ResolverLabel::System).await;
        let ip = timing.outcome.address().expect("localhost should resolve");
        assert!(ip.is_loopback());
    }

    #[tokio::test]
    async fn test_nameserver_lookup_of_ip_literal_skips_query() {
        // An unroutable nameserver is never contacted for an address literal.
        let nameserver: IpAddr = "192.0.2.1".parse().expect("valid ip");
        let timer = ResolverTimer::new(short_options());
        let timing = timer
            .measure("127.0.0.1", ResolverLabel::Nameserver(nameserver))
            .await;
        assert_eq!(
            timing.outcome,
            DnsOutcome::Resolved("127.0.0.1".parse().expect("valid ip"))
        );
    }

    #[tokio::test]
    async fn test_ipv6_literal_resolves_on_every_label() {
        let loopback: IpAddr = "::1".parse().expect("valid ip");
        let nameserver: IpAddr = "192.0.2.1".parse().expect("valid ip");
        let timer = ResolverTimer::new(short_options());

        for label in [ResolverLabel::System, ResolverLabel::Nameserver(nameserver)] {
            let timing = timer.measure("::1", label).await;
            assert_eq!(timing.outcome, DnsOutcome::Resolved(loopback), "label {label}");
        }
    }

    #[tokio::test]
    async fn test_unreachable_nameserver_is_bounded_by_timeout() {
        let nameserver: IpAddr = "192.0.2.1".parse().expect("valid ip");
        let timer = ResolverTimer::new(short_options());
        let timing = timer
            .measure("example.com", ResolverLabel::Nameserver(nameserver))
            .await;
        assert!(timing.outcome.is_failed());
        assert!(timing.elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_invalid_domain_fails_with_sentinel() {
        let timer = ResolverTimer::new(short_options());
        let timing = timer
            .measure("nonexistent.invalid", ResolverLabel::System)
            .await;
        assert!(timing.outcome.is_failed());
        assert!(timing.outcome.to_string().starts_with(crate::dns::FAILED_ADDRESS));
    }

    #[test]
    fn test_timeout_kind_is_classified() {
        let err = ResolveError::from(ResolveErrorKind::Timeout);
        assert_eq!(classify_resolve_error(&err), DnsFailure::Timeout);

        let err = ResolveError::from("server misbehaving");
        assert!(matches!(classify_resolve_error(&err), DnsFailure::Lookup(_)));
    }
}
