use std::io::{self, BufRead, Write};

use url::{Host, Url};

/// Reduce user input to a bare host name: trims whitespace, drops an
/// `http://` or `https://` scheme, any path, query or port, and lowercases.
/// IPv6 literals are returned without brackets. Returns `None` when nothing
/// usable is left.
pub fn normalize_domain(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);

    let url = Url::parse(&format!("https://{without_scheme}")).ok()?;
    match url.host()? {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.');
            (!domain.is_empty()).then(|| domain.to_string())
        }
        Host::Ipv4(ip) => Some(ip.to_string()),
        Host::Ipv6(ip) => Some(ip.to_string()),
    }
}

/// Ask for the domain to monitor until a usable one is entered.
pub fn read_domain<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<String> {
    loop {
        write!(output, "Enter the domain to monitor: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no domain entered",
            ));
        }

        match normalize_domain(&line) {
            Some(domain) => return Ok(domain),
            None if line.trim().is_empty() => writeln!(output, "Domain cannot be empty.")?,
            None => writeln!(output, "'{}' is not a valid domain.", line.trim())?,
        }
    }
}
