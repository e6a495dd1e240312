//! File content validation services
//!
//! Builds the per-file result envelopes, routes them to the aggregator through
//! a [`MessagePublisher`] and ties parameter checks, orchestration and dispatch
//! together in [`FileContentValidationHandler`].

pub mod dispatcher;
pub mod envelope;
pub mod handler;
pub mod publisher;

// Re-export commonly used types
pub use dispatcher::ResultDispatcher;
pub use envelope::{build_envelope, routing_key_for, ROUTING_KEY_ERROR, ROUTING_KEY_SUCCESS};
pub use handler::{DispatchedEnvelope, FileContentValidationHandler, HandlerOutcome};
pub use publisher::{MessagePublisher, PublishedMessage, RecordingPublisher, StdoutPublisher};
