use std::io::{self, Stdout, Write};

use colored::{Color, ColoredString, Colorize};
use unicode_truncate::UnicodeTruncateStr;

use super::ProbeSink;
use crate::config::app_config::AppConfig;
use crate::dns::ResolverLabel;
use crate::error::SinkError;
use crate::probe::record::{ProbeRecord, TIMESTAMP_FORMAT, format_millis};

fn to_fixed_width(input: &str, width: usize) -> String {
    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

/// Colour for a record: green for 2xx, red for a failed HTTP check,
/// neutral for anything else.
pub fn outcome_color(record: &ProbeRecord) -> Option<Color> {
    if record.http.is_2xx() {
        Some(Color::Green)
    } else if record.http.is_failure() {
        Some(Color::Red)
    } else {
        None
    }
}

/// Renders records to stdout, one coloured line each.
#[derive(Debug)]
pub struct ConsoleSink<W = Stdout> {
    label_width: usize,
    out: W,
}

impl ConsoleSink {
    pub fn new(labels: &[ResolverLabel]) -> Self {
        Self::with_writer(labels, io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn with_writer(labels: &[ResolverLabel], out: W) -> Self {
        let label_width = labels
            .iter()
            .map(|l| l.to_string().len())
            .max()
            .unwrap_or(15);
        Self { label_width, out }
    }

    pub fn render(&self, record: &ProbeRecord) -> String {
        let address = match record.dns.address() {
            Some(_) => record.dns.to_string().normal(),
            None => record.dns.to_string().red(),
        };
        let http = paint(record.http.to_string(), outcome_color(record));

        format!(
            "{} [{}] IP: {} | DNS Time: {}ms | HTTP: {} | HTTP Time: {}ms | Total: {}ms",
            record.timestamp.format(TIMESTAMP_FORMAT),
            to_fixed_width(&record.resolver.to_string(), self.label_width),
            address,
            format_millis(record.dns_time),
            http,
            format_millis(record.http_time),
            format_millis(record.total_time),
        )
    }
}

fn paint(text: String, color: Option<Color>) -> ColoredString {
    match color {
        Some(color) => text.color(color),
        None => text.normal(),
    }
}

impl<W: Write> ProbeSink for ConsoleSink<W> {
    fn emit(&mut self, record: &ProbeRecord) -> Result<(), SinkError> {
        let line = self.render(record);
        writeln!(self.out, "{line}")
            .and_then(|_| self.out.flush())
            .map_err(SinkError::Console)
    }
}

/// Print the run parameters once at startup.
pub fn print_banner(config: &AppConfig, domain: &str) {
    println!("{}", format!("Monitoring {domain}").bold());
    let resolvers: Vec<String> = config
        .resolver_labels()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("  Resolvers: {}", resolvers.join(", "));
    println!("  Interval:  {}ms", config.interval.as_millis());
    println!("  Log file:  {}", config.log_file.display());
    println!("  Press Ctrl+C to stop.");
}
