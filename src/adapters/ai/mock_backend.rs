//! Mock Generative Backend for testing.
//!
//! Provides a configurable mock implementation of the GenerativeBackend port,
//! allowing tests to run without calling the real model API.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Error injection for rotation testing
//! - Simulated delays and in-flight tracking for lock testing
//! - Call tracking (which key, which request) for verification
//!
//! # Example
//!
//! ```ignore
//! let backend = MockBackend::new()
//!     .with_error(BackendError::quota_exceeded("429"))
//!     .with_response("Hello!");
//!
//! let client = CredentialRotatingClient::new(Arc::new(backend.clone()), pool);
//! client.generate(&turns).await?;
//! assert_eq!(backend.used_keys(), vec!["key-0", "key-1"]);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{BackendError, BackendInfo, Generation, GenerationRequest, GenerativeBackend};

/// Mock backend for testing.
#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Backend info to return.
    info: BackendInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<MockCall>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return generated text.
    Text(String),
    /// Return a success without content.
    Empty,
    /// Return an error.
    Error(BackendError),
}

/// One recorded backend call.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// The key the call was made with.
    pub api_key: String,
    /// The request as received.
    pub request: GenerationRequest,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Creates a new mock backend with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: BackendInfo::new("mock", "mock-chat-1", "mock-vision-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(MockResponse::Text(text.into()))
    }

    /// Adds a success without content to the queue.
    pub fn with_empty_response(self) -> Self {
        self.push(MockResponse::Empty)
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: BackendError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn push(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Returns the number of calls made to this backend.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Keys used, in call order.
    pub fn used_keys(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.api_key.clone())
            .collect()
    }

    /// Highest number of calls observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Gets the next response or a default.
    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Text("Mock response".to_string()))
    }

    fn model_for(&self, request: &GenerationRequest) -> &str {
        match request {
            GenerationRequest::Chat { .. } => &self.info.chat_model,
            GenerationRequest::Attachment { .. } => &self.info.vision_model,
        }
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn generate(
        &self,
        api_key: &Secret<String>,
        request: &GenerationRequest,
    ) -> Result<Generation, BackendError> {
        // Record the call
        self.calls.lock().unwrap().push(MockCall {
            api_key: api_key.expose_secret().clone(),
            request: request.clone(),
        });

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        // Simulate delay
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let model = self.model_for(request);
        match self.next_response() {
            MockResponse::Text(text) => Ok(Generation::text(text, model)),
            MockResponse::Empty => Ok(Generation::empty(model)),
            MockResponse::Error(err) => Err(err),
        }
    }

    fn backend_info(&self) -> BackendInfo {
        self.info.clone()
    }
}
