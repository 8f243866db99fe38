pub mod chat;
pub mod client;
pub mod stream;
pub mod types;

pub use chat::OpenAiChatClient;
