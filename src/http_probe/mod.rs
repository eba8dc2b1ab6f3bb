pub mod probe;
pub mod result;

use std::fmt::Write;

pub mod prelude {
    pub use super::probe::{HttpOptions, HttpTimer};
    pub use super::result::{HttpOutcome, HttpTiming};
}

/// Flatten an error and its source chain into a single line.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}
