use std::net::Ipv6Addr;
use std::time::{Duration, Instant};

use reqwest::{
    Client,
    header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA, SERVER},
    redirect::Policy,
};
use hyper::ext::ReasonPhrase;
use tokio::time::timeout;
use url::Url;

use super::prelude::*;
use super::report;
use crate::probe::TimedRequest;

/// Fixed bounds and identity for the HTTP check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
            user_agent: default_user_agent(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Issues one cold `GET https://{domain}` per call and times it up to the
/// response headers. A new client is built for every call and keeps no idle
/// connections, so each probe opens its own TCP and TLS session.
#[derive(Debug, Clone)]
pub struct HttpTimer {
    options: HttpOptions,
    scheme: &'static str,
}

impl HttpTimer {
    pub fn new(options: HttpOptions) -> Self {
        Self {
            options,
            scheme: "https",
        }
    }

    /// Probe plain HTTP instead, so tests can run against a local listener.
    #[cfg(test)]
    pub(crate) fn with_scheme(mut self, scheme: &'static str) -> Self {
        self.scheme = scheme;
        self
    }

    fn target_url(&self, domain: &str) -> Result<Url, url::ParseError> {
        match domain.parse::<Ipv6Addr>() {
            Ok(ip) => Url::parse(&format!("{}://[{ip}]", self.scheme)),
            Err(_) => Url::parse(&format!("{}://{}", self.scheme, domain)),
        }
    }

    fn build_client(&self) -> reqwest::Result<Client> {
        Client::builder()
            .connect_timeout(self.options.connect_timeout)
            .timeout(self.options.request_timeout)
            .pool_max_idle_per_host(0)
            .redirect(Policy::none())
            .user_agent(self.options.user_agent.as_str())
            .default_headers(no_cache_headers())
            .build()
    }

    pub async fn measure(&self, domain: &str) -> HttpTiming {
        let url = match self.target_url(domain) {
            Ok(url) => url,
            Err(e) => {
                log::debug!("Cannot build URL for {domain}: {e}");
                return HttpTiming {
                    outcome: HttpOutcome::OtherError("invalid url".to_string()),
                    elapsed: Duration::ZERO,
                };
            }
        };

        let client = match self.build_client() {
            Ok(client) => client,
            Err(e) => {
                log::warn!("Failed to create HTTP client: {}", report(&e));
                return HttpTiming {
                    outcome: HttpOutcome::OtherError(error_category(&e).to_string()),
                    elapsed: Duration::ZERO,
                };
            }
        };

        let request = client.get(url);

        let start = Instant::now();
        let result = timeout(self.options.request_timeout, request.send()).await;
        let elapsed = start.elapsed();

        // The body is never read; dropping the response closes the connection.
        let outcome = match result {
            Ok(Ok(response)) => success_outcome(&response),
            Ok(Err(e)) => classify_error(&e),
            Err(_) => HttpOutcome::Timeout,
        };

        HttpTiming { outcome, elapsed }
    }
}

impl TimedRequest for HttpTimer {
    async fn request(&self, domain: &str) -> HttpTiming {
        self.measure(domain).await
    }
}

fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

fn success_outcome(response: &reqwest::Response) -> HttpOutcome {
    let status = response.status();
    // `|` separates log fields.
    let server = response
        .headers()
        .get(SERVER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.replace('|', "/"));

    // hyper only keeps the phrase when it differs from the canonical one.
    let reason = response
        .extensions()
        .get::<ReasonPhrase>()
        .and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok())
        .map(|phrase| phrase.trim().replace('|', "/"))
        .filter(|phrase| !phrase.is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string));

    HttpOutcome::Success {
        status: status.as_u16(),
        reason,
        server,
    }
}

fn classify_error(err: &reqwest::Error) -> HttpOutcome {
    if err.is_timeout() {
        HttpOutcome::Timeout
    } else if err.is_connect() || err.is_request() {
        HttpOutcome::RequestError(report(err))
    } else {
        HttpOutcome::OtherError(error_category(err).to_string())
    }
}

fn error_category(err: &reqwest::Error) -> &'static str {
    if err.is_builder() {
        "builder"
    } else if err.is_redirect() {
        "redirect"
    } else if err.is_status() {
        "status"
    } else if err.is_body() {
        "body"
    } else if err.is_decode() {
        "decode"
    } else {
        "unknown"
    }
}
