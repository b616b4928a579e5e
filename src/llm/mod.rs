pub mod client;
pub mod types;

pub use client::CompletionClient;
pub use types::ChatMessage;
