/// HTTP implementation of the upstream boundary, with rate limiting
use super::upstream::UpstreamClient;
use crate::config::UpstreamConfig;
use crate::errors::{ExplorerError, ExplorerResult};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use parking_lot::Mutex as SyncMutex;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

/// Client-side rate limiter: one request at a time, evenly spaced
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(max_per_minute: usize) -> Self {
        let min_interval = if max_per_minute > 0 {
            Duration::from_secs_f64(60.0 / max_per_minute as f64)
        } else {
            Duration::ZERO
        };

        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait until a request may be sent
    pub async fn acquire(&self) -> ExplorerResult<RateLimitGuard> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ExplorerError::Task(format!("Rate limiter closed: {}", e)))?;

        if !self.min_interval.is_zero() {
            let mut last = self.last_request.lock().await;
            if let Some(last_time) = *last {
                let elapsed = last_time.elapsed();
                if elapsed < self.min_interval {
                    tokio::time::sleep(self.min_interval - elapsed).await;
                }
            }
            *last = Some(Instant::now());
        }

        Ok(RateLimitGuard { _permit: permit })
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// RAII guard returned by [`RateLimiter::acquire`]
pub struct RateLimitGuard {
    _permit: OwnedSemaphorePermit,
}

/// Request counters for the upstream connection
#[derive(Debug, Clone, Default)]
pub struct UpstreamStats {
    pub requests: u64,
    pub failures: u64,
    pub total_latency_ms: f64,
}

impl UpstreamStats {
    pub fn avg_latency_ms(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.total_latency_ms / self.requests as f64
        }
    }
}

pub struct HttpUpstream {
    client: Client,
    base_url: String,
    limiter: Option<RateLimiter>,
    stats: SyncMutex<UpstreamStats>,
}

impl HttpUpstream {
    pub fn new(config: &UpstreamConfig) -> ExplorerResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExplorerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let limiter = if config.max_requests_per_minute > 0 {
            Some(RateLimiter::new(config.max_requests_per_minute))
        } else {
            None
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter,
            stats: SyncMutex::new(UpstreamStats::default()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn stats(&self) -> UpstreamStats {
        self.stats.lock().clone()
    }

    fn record(&self, success: bool, started: Instant) {
        let mut stats = self.stats.lock();
        stats.requests += 1;
        stats.total_latency_ms += started.elapsed().as_secs_f64() * 1000.0;
        if !success {
            stats.failures += 1;
        }
    }

    async fn send(&self, path: &str) -> ExplorerResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ExplorerError::upstream(path, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::UpstreamStatus {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        // Some endpoints answer with a bare text number or hash
        let body = response
            .text()
            .await
            .map_err(|e| ExplorerError::upstream(path, e.to_string()))?;
        Ok(parse_body(&body))
    }
}

/// JSON when it parses, otherwise the trimmed text as a JSON string
fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.trim().to_string()))
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn request(&self, path: &str) -> ExplorerResult<Value> {
        let _guard = match &self.limiter {
            Some(limiter) => Some(limiter.acquire().await?),
            None => None,
        };

        let started = Instant::now();
        let result = self.send(path).await;
        self.record(result.is_ok(), started);

        if let Err(e) = &result {
            logger::debug(LogTag::Upstream, &format!("GET {} failed: {}", path, e));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body_handles_text_endpoints() {
        assert_eq!(parse_body("840000\n"), Value::from(840000u64));
        assert_eq!(
            parse_body("000000000000000000015b6e\n"),
            Value::String("000000000000000000015b6e".to_string())
        );
        assert_eq!(parse_body(r#"{"a":1}"#)["a"], Value::from(1));
    }

    #[test]
    fn test_rate_limiter_interval() {
        assert_eq!(RateLimiter::new(60).min_interval(), Duration::from_secs(1));
        assert!(RateLimiter::new(0).min_interval().is_zero());
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(1200); // 50ms apart
        let started = Instant::now();
        for _ in 0..3 {
            let _guard = limiter.acquire().await.unwrap();
        }
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = UpstreamConfig {
            base_url: "http://localhost:3000/api/".to_string(),
            ..UpstreamConfig::default()
        };
        let upstream = HttpUpstream::new(&config).unwrap();
        assert_eq!(upstream.base_url(), "http://localhost:3000/api");
        assert_eq!(upstream.stats().requests, 0);
    }
}
