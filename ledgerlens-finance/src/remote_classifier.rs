//! HTTP client for the trained description classifier.
//!
//! Request:  POST {endpoint}  {"text": "UPI/ZOMATO/8812"}
//! Response: {"category": "food_dining"}

use ledgerlens_core::{ClassifyError, Classifier};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    category: String,
}

#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    endpoint: String,
    client: reqwest::Client,
}

impl RemoteClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClassifyError> {
        // No idle pool: blocking calls may each run on a short-lived runtime
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| ClassifyError::Request(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn classify_async(&self, description: &str) -> Result<String, ClassifyError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { text: description })
            .send()
            .await
            .map_err(|e| ClassifyError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClassifyError::Request(format!("classifier returned HTTP {status}")));
        }

        let body: ClassifyResponse = resp
            .json()
            .await
            .map_err(|e| ClassifyError::InvalidResponse(e.to_string()))?;
        Ok(body.category)
    }

    fn classify_blocking(&self, description: &str) -> Result<String, ClassifyError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClassifyError::Request(format!("create tokio runtime: {e}")))?;
        rt.block_on(self.classify_async(description))
    }
}

impl Classifier for RemoteClassifier {
    fn classify(&self, description: &str) -> Result<String, ClassifyError> {
        // Callers are sync. block_in_place only works on the multi-thread
        // runtime; a current-thread runtime cannot be blocked from inside, so
        // the request runs on a scoped thread with its own runtime.
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.classify_async(description)))
            }
            Ok(_) => std::thread::scope(|s| {
                s.spawn(|| self.classify_blocking(description))
                    .join()
                    .unwrap_or_else(|_| Err(ClassifyError::Request("classifier thread panicked".to_string())))
            }),
            Err(_) => self.classify_blocking(description),
        }
    }
}
