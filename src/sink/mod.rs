pub mod console;
pub mod log_file;

use crate::error::SinkError;
use crate::probe::record::ProbeRecord;

pub mod prelude {
    pub use super::ProbeSink;
    pub use super::console::ConsoleSink;
    pub use super::log_file::LogFileSink;
}

/// Consumer of finished probe records. Errors are fatal to the caller.
pub trait ProbeSink {
    fn emit(&mut self, record: &ProbeRecord) -> Result<(), SinkError>;
}

/// Emits to both sinks in order, stopping at the first failure.
impl<A: ProbeSink, B: ProbeSink> ProbeSink for (A, B) {
    fn emit(&mut self, record: &ProbeRecord) -> Result<(), SinkError> {
        self.0.emit(record)?;
        self.1.emit(record)
    }
}
