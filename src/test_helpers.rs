//! Shared test utilities for the clinic-content test suite.
//!
//! Provides sample payloads, canned errors, and a scheduler helper for
//! tests that drive [`LiveQuery`](crate::live::LiveQuery) on tokio's
//! current-thread test runtime.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let gate = client.gate(QUERY);
//! let live: LiveQuery<Value> = LiveQuery::new(client.clone(), QueryDescriptor::new(QUERY));
//! gate.send(Err(network_error())).unwrap();
//! drain_tasks().await;
//! ```

use crate::client::ContentError;
use serde_json::{Value, json};

/// Let every runnable task make progress.
///
/// On the current-thread runtime a woken task runs at the next yield, so a
/// handful of yields settles any fetch whose gate has already fired.
pub async fn drain_tasks() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// The transport failure used throughout the query tests.
pub fn network_error() -> ContentError {
    ContentError::Transport("Network error".into())
}

/// A one-service result set, as the services query returns it.
pub fn services_payload() -> Value {
    json!([{"id": "1", "title": "Implants"}])
}
