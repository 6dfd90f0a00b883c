//! Messenger adapters.
//!
//! - `StdioMessenger` - JSON lines over any async writer (used by the binary)
//! - `RecordingMessenger` - Records outbound actions for tests

mod recording;
mod stdio;

pub use recording::{Outbound, RecordingMessenger};
pub use stdio::{parse_event_line, StdioMessenger};
