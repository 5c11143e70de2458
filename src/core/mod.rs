//! Protocol primitives.
//!
//! Envelope encryption, ticket token signing, and lookup identifiers.
//! Nothing in this module performs I/O.

pub mod envelope;
pub mod lookup;
pub mod token;

// Re-export core types
pub use envelope::{CipherEnvelope, EnvelopeError};
pub use lookup::LookupId;
pub use token::{TokenCodec, TokenError};
