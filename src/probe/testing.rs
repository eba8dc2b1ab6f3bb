//! Fakes shared by the executor and scheduler tests.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::record::ProbeRecord;
use super::{TimedLookup, TimedRequest};
use crate::dns::{DnsFailure, DnsOutcome, DnsTiming, ResolverLabel};
use crate::error::SinkError;
use crate::http_probe::result::{HttpOutcome, HttpTiming};
use crate::sink::ProbeSink;

pub struct FakeLookup {
    outcome: DnsOutcome,
    delay: Duration,
}

impl FakeLookup {
    pub fn resolving(ip: &str, delay: Duration) -> Self {
        let ip: IpAddr = ip.parse().expect("valid ip");
        Self {
            outcome: DnsOutcome::Resolved(ip),
            delay,
        }
    }

    pub fn failing(failure: DnsFailure) -> Self {
        Self {
            outcome: DnsOutcome::Failed(failure),
            delay: Duration::ZERO,
        }
    }
}

impl TimedLookup for FakeLookup {
    async fn lookup(&self, _domain: &str, _label: ResolverLabel) -> DnsTiming {
        tokio::time::sleep(self.delay).await;
        DnsTiming {
            outcome: self.outcome.clone(),
            elapsed: self.delay,
        }
    }
}

pub struct FakeRequest {
    outcome: HttpOutcome,
    delay: Duration,
    pub calls: Arc<AtomicUsize>,
}

impl FakeRequest {
    pub fn ok(delay: Duration) -> Self {
        Self::outcome(
            HttpOutcome::Success {
                status: 200,
                reason: Some("OK".to_string()),
                server: Some("ECS".to_string()),
            },
            delay,
        )
    }

    pub fn outcome(outcome: HttpOutcome, delay: Duration) -> Self {
        Self {
            outcome,
            delay,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl TimedRequest for FakeRequest {
    async fn request(&self, _domain: &str) -> HttpTiming {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        HttpTiming {
            outcome: self.outcome.clone(),
            elapsed: self.delay,
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub records: Vec<ProbeRecord>,
}

impl ProbeSink for RecordingSink {
    fn emit(&mut self, record: &ProbeRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }
}

pub struct FailingSink;

impl ProbeSink for FailingSink {
    fn emit(&mut self, _record: &ProbeRecord) -> Result<(), SinkError> {
        Err(SinkError::Io {
            path: PathBuf::from("/nonexistent/domain_monitor.log"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    }
}
