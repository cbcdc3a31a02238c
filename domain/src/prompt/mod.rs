//! Prompt templates - turn a case into the opaque payloads sent to remote endpoints.

pub mod template;

pub use template::PromptTemplate;
