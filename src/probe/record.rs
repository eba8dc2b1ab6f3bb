use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::dns::prelude::*;
use crate::http_probe::prelude::*;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Closed set of probe results, derived from the DNS and HTTP outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Success,
    ResolutionFailed,
    Timeout,
    RequestError,
    OtherError,
}

/// The result of one probe of one domain against one resolver label.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRecord {
    pub timestamp: DateTime<Local>,
    pub resolver: ResolverLabel,
    pub domain: String,
    pub dns: DnsOutcome,
    pub dns_time: Duration,
    pub http: HttpOutcome,
    pub http_time: Duration,
    pub total_time: Duration,
}

impl ProbeRecord {
    pub fn status(&self) -> ProbeStatus {
        if self.dns.is_failed() {
            return ProbeStatus::ResolutionFailed;
        }
        match self.http {
            HttpOutcome::Success { .. } => ProbeStatus::Success,
            HttpOutcome::Timeout => ProbeStatus::Timeout,
            HttpOutcome::RequestError(_) => ProbeStatus::RequestError,
            HttpOutcome::OtherError(_) => ProbeStatus::OtherError,
        }
    }

    /// Render the record as one log line, without the trailing newline.
    pub fn log_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProbeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | DNS: {} | URL: {} | IP: {} | DNS Time: {}ms | HTTP: {} | HTTP Time: {}ms | Total: {}ms",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.resolver,
            self.domain,
            self.dns,
            format_millis(self.dns_time),
            self.http,
            format_millis(self.http_time),
            format_millis(self.total_time),
        )
    }
}

/// Milliseconds with exactly two decimals.
pub fn format_millis(duration: Duration) -> String {
    format!("{:.2}", duration.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const FIELD_PREFIXES: [&str; 7] = [
        "DNS: ",
        "URL: ",
        "IP: ",
        "DNS Time: ",
        "HTTP: ",
        "HTTP Time: ",
        "Total: ",
    ];

    /// Split a log line back into its eight fields. A segment that does not
    /// start with the next expected prefix belongs to the previous field,
    /// which is how `HTTP: 200 OK | Server: ECS` survives the split.
    fn parse_fields(line: &str) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for segment in line.split(" | ") {
            if fields.is_empty() {
                fields.push(segment.to_string());
                continue;
            }
            match FIELD_PREFIXES.get(fields.len() - 1) {
                Some(prefix) if segment.starts_with(prefix) => {
                    fields.push(segment[prefix.len()..].to_string())
                }
                _ => {
                    if let Some(last) = fields.last_mut() {
                        last.push_str(" | ");
                        last.push_str(segment);
                    }
                }
            }
        }
        fields
    }

    fn sample_record() -> ProbeRecord {
        let timestamp = Local
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .single()
            .expect("valid local time")
            + chrono::Duration::milliseconds(42);
        ProbeRecord {
            timestamp,
            resolver: ResolverLabel::Nameserver("8.8.8.8".parse().expect("valid ip")),
            domain: "example.com".to_string(),
            dns: DnsOutcome::Resolved("93.184.216.34".parse().expect("valid ip")),
            dns_time: Duration::from_micros(12_346),
            http: HttpOutcome::Success {
                status: 200,
                reason: Some("OK".to_string()),
                server: Some("ECS".to_string()),
            },
            http_time: Duration::from_micros(150_007),
            total_time: Duration::from_micros(163_100),
        }
    }

    #[test]
    fn test_log_line_format() {
        let record = sample_record();
        assert_eq!(
            record.log_line(),
            "2024-03-09 14:05:07.042 | DNS: 8.8.8.8 | URL: example.com | IP: 93.184.216.34 \
             | DNS Time: 12.35ms | HTTP: 200 OK | Server: ECS | HTTP Time: 150.01ms | Total: 163.10ms"
        );
    }

    #[test]
    fn test_log_line_fields_parse_back() {
        let record = sample_record();
        let fields = parse_fields(&record.log_line());
        assert_eq!(fields.len(), 8);
        assert_eq!(fields[0], record.timestamp.format(TIMESTAMP_FORMAT).to_string());
        assert_eq!(fields[1], record.resolver.to_string());
        assert_eq!(fields[2], record.domain);
        assert_eq!(fields[3], record.dns.to_string());
        assert_eq!(fields[4], format!("{}ms", format_millis(record.dns_time)));
        assert_eq!(fields[5], record.http.to_string());
        assert_eq!(fields[6], format!("{}ms", format_millis(record.http_time)));
        assert_eq!(fields[7], format!("{}ms", format_millis(record.total_time)));
    }

    #[test]
    fn test_failed_record_uses_sentinels() {
        let record = ProbeRecord {
            resolver: ResolverLabel::System,
            domain: "nonexistent.invalid".to_string(),
            dns: DnsOutcome::Failed(DnsFailure::NoAddress),
            dns_time: Duration::ZERO,
            http: HttpOutcome::RequestError("dns error".to_string()),
            http_time: Duration::ZERO,
            ..sample_record()
        };
        let fields = parse_fields(&record.log_line());
        assert_eq!(fields[1], "System Default");
        assert_eq!(fields[3], "N/A (no address returned)");
        assert_eq!(fields[4], "0.00ms");
        assert_eq!(fields[5], "Request Error: dns error");
        assert_eq!(record.status(), ProbeStatus::ResolutionFailed);
    }

    #[test]
    fn test_dns_failure_kind_is_kept_in_log_line() {
        let failed = |failure: DnsFailure| ProbeRecord {
            dns: DnsOutcome::Failed(failure),
            dns_time: Duration::from_secs(3),
            http: HttpOutcome::Timeout,
            ..sample_record()
        };
        let timeout = failed(DnsFailure::Timeout).log_line();
        let nxdomain = failed(DnsFailure::Lookup("NXDOMAIN".into())).log_line();
        assert_ne!(timeout, nxdomain);

        let fields = parse_fields(&timeout);
        assert_eq!(fields.len(), 8);
        assert_eq!(fields[3], "N/A (DNS timeout)");
        assert_eq!(parse_fields(&nxdomain)[3], "N/A (DNS error: NXDOMAIN)");
    }

    #[test]
    fn test_status_follows_http_outcome() {
        let mut record = sample_record();
        assert_eq!(record.status(), ProbeStatus::Success);

        record.http = HttpOutcome::Timeout;
        assert_eq!(record.status(), ProbeStatus::Timeout);

        record.http = HttpOutcome::RequestError("reset".into());
        assert_eq!(record.status(), ProbeStatus::RequestError);

        record.http = HttpOutcome::OtherError("unknown".into());
        assert_eq!(record.status(), ProbeStatus::OtherError);
    }

    #[test]
    fn test_format_millis_two_decimals() {
        assert_eq!(format_millis(Duration::ZERO), "0.00");
        assert_eq!(format_millis(Duration::from_millis(2000)), "2000.00");
        assert_eq!(format_millis(Duration::from_nanos(1_234_567)), "1.23");
    }
}
