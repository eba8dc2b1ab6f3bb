use std::time::Instant;

use chrono::Local;

use super::record::ProbeRecord;
use super::{TimedLookup, TimedRequest};
use crate::dns::{DnsOutcome, ResolverLabel};
use crate::error::SinkError;
use crate::sink::ProbeSink;

/// Runs one resolution and one HTTP request for a (domain, resolver) pair
/// and turns whatever they produced into a `ProbeRecord`.
///
/// Probing never fails. The only error surfaced from here is a sink
/// failure, which the caller must treat as fatal.
#[derive(Debug, Clone)]
pub struct ProbeExecutor<L, R> {
    lookup: L,
    request: R,
}

impl<L, R> ProbeExecutor<L, R>
where
    L: TimedLookup + Sync,
    R: TimedRequest + Sync,
{
    pub fn new(lookup: L, request: R) -> Self {
        Self { lookup, request }
    }

    pub async fn probe(&self, domain: &str, resolver: ResolverLabel) -> ProbeRecord {
        let timestamp = Local::now();
        let start = Instant::now();

        let dns = self.lookup.lookup(domain, resolver).await;
        if let DnsOutcome::Failed(reason) = &dns.outcome {
            log::warn!("[{resolver}] resolution of {domain} failed: {reason}");
        }

        // Attempted regardless of the DNS result; the HTTP client resolves on its own.
        let http = self.request.request(domain).await;

        let total_time = start.elapsed();

        let record = ProbeRecord {
            timestamp,
            resolver,
            domain: domain.to_string(),
            dns: dns.outcome,
            dns_time: dns.elapsed,
            http: http.outcome,
            http_time: http.elapsed,
            total_time,
        };
        log::debug!("[{resolver}] probe of {domain} finished: {:?}", record.status());
        record
    }

    /// Probe, then hand the record to `sink` before returning.
    pub async fn run<S: ProbeSink>(
        &self,
        domain: &str,
        resolver: ResolverLabel,
        sink: &mut S,
    ) -> Result<ProbeRecord, SinkError> {
        let record = self.probe(domain, resolver).await;
        sink.emit(&record)?;
        Ok(record)
    }
}
