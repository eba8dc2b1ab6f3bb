pub mod executor;
pub mod record;
#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;

use crate::dns::{DnsTiming, ResolverLabel};
use crate::http_probe::result::HttpTiming;

pub mod prelude {
    pub use super::executor::ProbeExecutor;
    pub use super::record::{ProbeRecord, ProbeStatus};
    pub use super::{TimedLookup, TimedRequest};
}

/// A name resolution that reports its own outcome and elapsed time.
/// Implementations never fail: faults are folded into the returned timing.
pub trait TimedLookup {
    fn lookup(&self, domain: &str, label: ResolverLabel) -> impl Future<Output = DnsTiming> + Send;
}

/// A single HTTPS request that reports its own outcome and elapsed time.
pub trait TimedRequest {
    fn request(&self, domain: &str) -> impl Future<Output = HttpTiming> + Send;
}
