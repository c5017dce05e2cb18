// src/checker/http.rs
// =============================================================================
// This module checks if external URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to GET when HEAD is answered with an error status
//   (many servers answer 405 or 403 to HEAD but serve GET fine)
// - Retries failed checks with a linear backoff: attempt N sleeps N * backoff
// - Describes failure modes (timeout, DNS, TLS, redirect loops, ...)
//
// One attempt is a tiny state machine:
//
//     Head --(status < 400)--> Reachable
//     Head --(status >= 400)--> GetFallback --> Reachable / Failed
//     Head --(transport error)--> Failed
//
// GetFallback always ends the attempt, so there is never more than one GET
// per attempt.
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - Traits: Probe lets tests swap the network for a fake
// - impl Future in traits: async methods without boxing
// =============================================================================

use crate::config::VerifyConfig;
use crate::engine::scheduler::StopSignal;
use crate::error::Result;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Maximum redirects followed before a URL counts as a redirect loop
const MAX_REDIRECTS: usize = 10;

/// Result of checking one external URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCheckResult {
    /// True when the final status code was below 400
    pub reachable: bool,
    /// HTTP status of the last response, if any response arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Human readable summary ("HTTP 200 OK", "Request timed out", ...)
    pub message: String,
}

impl ExternalCheckResult {
    /// A failure without any HTTP response (timeouts, panics, ...)
    pub fn failed(message: impl Into<String>) -> Self {
        ExternalCheckResult {
            reachable: false,
            status_code: None,
            message: message.into(),
        }
    }
}

/// Something that can tell whether an external URL is alive.
///
/// The engine only talks to this trait. `HttpProbe` is the real
/// implementation; tests plug in counting fakes.
pub trait Probe: Send + Sync + 'static {
    fn check(&self, url: &str) -> impl Future<Output = ExternalCheckResult> + Send;
}

/// Real HTTP prober built on a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    attempts: u32,
    backoff: Duration,
    timeout: Duration,
    stop: StopSignal,
}

// Where the current attempt stands
enum Step {
    Head,
    GetFallback { head_status: StatusCode },
}

impl HttpProbe {
    /// Creates a probe with the timeout, retry and User-Agent settings
    /// from the config.
    ///
    /// We reuse one client for every request (connection pooling).
    pub fn new(config: &VerifyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(HttpProbe {
            client,
            attempts: config.attempts(),
            backoff: config.backoff,
            timeout: config.timeout,
            stop: StopSignal::new(),
        })
    }

    /// Once `stop` is raised, no further attempt starts and a pending
    /// backoff sleep is cut short.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    // Checks one URL, retrying up to the configured number of attempts
    //
    // Returns the first reachable result, or the most informative failure
    // once all attempts are used up (or the stop signal ends the retries).
    pub async fn check_url(&self, url: &str) -> ExternalCheckResult {
        let url = normalize_url(url);
        let mut best: Option<ExternalCheckResult> = None;

        for attempt in 1..=self.attempts {
            let result = self.attempt(&url).await;
            if result.reachable {
                return result;
            }

            debug!(url = %url, attempt, message = %result.message, "probe attempt failed");

            // Prefer a failure that carries a status code over a bare
            // transport error from a later attempt
            let replace = match &best {
                None => true,
                Some(previous) => result.status_code.is_some() || previous.status_code.is_none(),
            };
            if replace {
                best = Some(result);
            }

            if attempt == self.attempts {
                break;
            }
            let interrupted = tokio::select! {
                _ = tokio::time::sleep(self.backoff * attempt) => self.stop.is_stopped(),
                _ = self.stop.stopped() => true,
            };
            if interrupted {
                debug!(url = %url, attempt, "stopping retries after interrupt");
                break;
            }
        }

        best.unwrap_or_else(|| ExternalCheckResult::failed("No attempts were made"))
    }

    // Runs a single HEAD (+ optional GET) attempt
    async fn attempt(&self, url: &str) -> ExternalCheckResult {
        let mut step = Step::Head;
        loop {
            match step {
                Step::Head => match self.client.head(url).send().await {
                    Ok(response) if response.status().as_u16() < 400 => {
                        return analyze_response(response.status());
                    }
                    Ok(response) => {
                        step = Step::GetFallback {
                            head_status: response.status(),
                        };
                    }
                    Err(e) => return categorize_error(&e, self.timeout),
                },
                Step::GetFallback { head_status } => {
                    // send() returns once headers arrive; the body is never
                    // read and is dropped with the response
                    return match self.client.get(url).send().await {
                        Ok(response) => analyze_response(response.status()),
                        Err(e) => {
                            let failure = categorize_error(&e, self.timeout);
                            ExternalCheckResult {
                                reachable: false,
                                status_code: Some(head_status.as_u16()),
                                message: format!(
                                    "HEAD returned HTTP {}, GET failed: {}",
                                    head_status.as_u16(),
                                    failure.message
                                ),
                            }
                        }
                    };
                }
            }
        }
    }
}

impl Probe for HttpProbe {
    fn check(&self, url: &str) -> impl Future<Output = ExternalCheckResult> + Send {
        self.check_url(url)
    }
}

// Gives protocol-relative URLs an explicit https: scheme
//
// Example: "//cdn.example.com/x" -> "https://cdn.example.com/x"
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}

// Analyzes an HTTP status code to determine link status
//
// HTTP status codes:
// - 200-299: Success
// - 300-399: Redirect (only seen if the redirect could not be followed)
// - 400-499: Client error (404 not found, etc.)
// - 500-599: Server error
fn analyze_response(status: StatusCode) -> ExternalCheckResult {
    let message = match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    };

    ExternalCheckResult {
        reachable: status.as_u16() < 400,
        status_code: Some(status.as_u16()),
        message,
    }
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
// - etc.
fn categorize_error(error: &reqwest::Error, timeout: Duration) -> ExternalCheckResult {
    // The Debug form includes the whole source chain (hyper, DNS, TLS errors)
    let details = format!("{:?}", error).to_lowercase();

    let message = if error.is_timeout() {
        format!("Request timed out after {:.1}s", timeout.as_secs_f64())
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else if details.contains("dns") {
        "Could not resolve hostname".to_string()
    } else if details.contains("certificate") || details.contains("ssl") || details.contains("tls") {
        "SSL certificate error".to_string()
    } else if error.is_connect() {
        "Connection failed".to_string()
    } else {
        error.to_string()
    };

    ExternalCheckResult::failed(message)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why HEAD first?
//    - HEAD asks for the headers only, so nothing but a status line and a few
//      headers travel over the wire
//    - Some servers (and CDNs) reject HEAD with 403/405, hence the GET fallback
//
// 2. What does `self.backoff * attempt` do?
//    - Duration implements Mul<u32>, so 1s * 2 = 2s
//    - Attempt 1 waits 1x the backoff, attempt 2 waits 2x, and so on
//
// 3. What is `impl Future<Output = ...> + Send` in a trait?
//    - It lets a trait method be async without boxing the future
//    - `+ Send` promises the future can move between tokio worker threads,
//      which tokio::spawn requires
// -----------------------------------------------------------------------------
