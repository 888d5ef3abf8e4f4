//! Instrumented outbound calls.
//!
//! # Data Flow
//! ```text
//! RequestContext + path + optional payload
//!     → BUILD    identity headers, JSON body (encode failure: local error, no sample)
//!     → SEND     exactly one attempt, raced against the context's scope
//!     → CLASSIFY transport error or status >= 300 is a failure
//!     → RECORD   one rpc sample (503 substituted when there was no response)
//!     → RETURN   response, or a BadGateway TaxonomyError
//!
//! latency.rs watches the whole call and warns past the configured threshold
//! ```
//!
//! # Design Decisions
//! - No retries: the caller owns retry policy
//! - Downstream statuses never pass through to the caller's caller
//! - Cancellation of the inbound request aborts the outbound call immediately

pub mod instrumented;
pub mod latency;

pub use instrumented::InstrumentedClient;
