//! Generation Adapters.
//!
//! Credential rotation on top of the GenerativeBackend port.
//!
//! ## Available Adapters
//!
//! - `CredentialPool` - Ordered API keys with a shared rotation cursor
//! - `CredentialRotatingClient` - Generation with automatic key rotation
//! - `MockBackend` - Configurable mock for testing

mod credential_pool;
mod mock_backend;
mod rotating_client;

pub use credential_pool::{CredentialPool, CredentialPoolError, PoolLease};
pub use mock_backend::{MockBackend, MockCall, MockResponse};
pub use rotating_client::{CredentialRotatingClient, ModelReply, NO_RESPONSE_SENTINEL};
