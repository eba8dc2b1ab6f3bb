use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;

use crate::dns::ResolverLabel;
use crate::error::MonitorError;
use crate::probe::prelude::*;
use crate::sink::ProbeSink;

enum SweepEnd {
    Completed,
    Cancelled,
}

/// Repeats sweeps over the resolver labels until shutdown is signalled.
///
/// Probes run one at a time in label order, and the next sweep starts only
/// after the interval has elapsed. Shutdown is observed before every probe,
/// while a probe is in flight (the probe is dropped) and during the wait
/// between sweeps.
pub struct Scheduler<L, R> {
    executor: ProbeExecutor<L, R>,
    resolvers: Vec<ResolverLabel>,
    interval: Duration,
}

impl<L, R> Scheduler<L, R>
where
    L: TimedLookup + Sync,
    R: TimedRequest + Sync,
{
    pub fn new(
        executor: ProbeExecutor<L, R>,
        resolvers: Vec<ResolverLabel>,
        interval: Duration,
    ) -> Self {
        Self {
            executor,
            resolvers,
            interval,
        }
    }

    /// Run until `shutdown` turns `true`, returning the number of completed
    /// sweeps. A sink failure ends the loop with an error.
    pub async fn run<S: ProbeSink + Send>(
        &self,
        domain: &str,
        sink: &mut S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<u64, MonitorError> {
        let mut sweeps = 0;

        loop {
            match self.sweep(domain, sink, &mut shutdown).await? {
                SweepEnd::Completed => sweeps += 1,
                SweepEnd::Cancelled => break,
            }

            if is_cancelled(&shutdown) {
                break;
            }

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = cancelled(&mut shutdown) => break,
            }
        }

        log::info!("Stopped monitoring {domain} after {sweeps} completed sweeps");
        Ok(sweeps)
    }

    async fn sweep<S: ProbeSink + Send>(
        &self,
        domain: &str,
        sink: &mut S,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<SweepEnd, MonitorError> {
        for resolver in &self.resolvers {
            if is_cancelled(shutdown) {
                return Ok(SweepEnd::Cancelled);
            }

            tokio::select! {
                biased;
                _ = cancelled(shutdown) => {
                    log::debug!("Probe against {resolver} abandoned on shutdown");
                    return Ok(SweepEnd::Cancelled);
                }
                result = self.executor.run(domain, *resolver, sink) => {
                    result?;
                }
            }
        }
        Ok(SweepEnd::Completed)
    }
}

fn is_cancelled(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}

/// Resolves once shutdown is signalled. If the sender is gone no signal can
/// arrive any more, so this never resolves.
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
