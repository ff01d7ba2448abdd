//! Request, response and error types exchanged with relay clients.

pub mod catalog;
pub mod envelope;
pub mod generation;

pub use catalog::{ModelDescriptor, ModelRecord};
pub use envelope::ErrorEnvelope;
pub use generation::{GenerationRequest, GenerationResult, PROMPT_REQUIRED};
