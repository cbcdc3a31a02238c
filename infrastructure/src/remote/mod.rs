//! Remote endpoint adapters

mod chat_completions;

pub use chat_completions::ChatCompletionsEndpoint;
