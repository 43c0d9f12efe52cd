//! Domain logic for the Palisade settlement companion.
//!
//! This crate has no I/O. It holds the error taxonomy, shared ID/timestamp
//! types, the invite-code generator, the profession slot state machine, the
//! claim/switch/onboarding flow step definitions, the sync progress stage
//! table, and the skill/tier lookup helpers. Both the API service and the
//! client flow library build on it.

pub mod error;
pub mod flow;
pub mod invite_code;
pub mod professions;
pub mod skills;
pub mod sync_progress;
pub mod types;

pub use error::CoreError;
