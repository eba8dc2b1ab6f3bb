use std::fmt;
use std::time::Duration;

/// Classified outcome of one HTTPS request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpOutcome {
    Success {
        status: u16,
        reason: Option<String>,
        server: Option<String>,
    },
    Timeout,
    /// Transport or protocol failure, with the flattened error message.
    RequestError(String),
    /// Any other fault, reported by category only.
    OtherError(String),
}

impl HttpOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, HttpOutcome::Success { .. })
    }

    pub fn is_2xx(&self) -> bool {
        matches!(self, HttpOutcome::Success { status, .. } if (200..300).contains(status))
    }
}

impl fmt::Display for HttpOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpOutcome::Success {
                status,
                reason,
                server,
            } => {
                write!(f, "{status}")?;
                if let Some(reason) = reason {
                    write!(f, " {reason}")?;
                }
                if let Some(server) = server {
                    write!(f, " | Server: {server}")?;
                }
                Ok(())
            }
            HttpOutcome::Timeout => f.write_str("Timeout"),
            HttpOutcome::RequestError(msg) => write!(f, "Request Error: {msg}"),
            HttpOutcome::OtherError(category) => write!(f, "Other Error: {category}"),
        }
    }
}

/// Outcome and elapsed time of one HTTP request, send to headers received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTiming {
    pub outcome: HttpOutcome,
    pub elapsed: Duration,
}
