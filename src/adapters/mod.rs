//! Adapter layer modules for external system integration.
//!
//! Provides the seams a signing job talks through:
//! - signature format engines (two-phase data-to-sign / assemble)
//! - signing keys (smart card, HSM, software keystore)
//! - result sinks, including saving next to the source file
//! - the JSON sign request body

pub mod engine;
pub mod key;
pub mod request;
pub mod responder;

pub use engine::{SignatureEngine, SignatureEngines};
pub use key::SigningKey;
pub use request::{RequestDocument, SignRequestBody};
pub use responder::{signed_extension, Responder, SaveFileResponder};
