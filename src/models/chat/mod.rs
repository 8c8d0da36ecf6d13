pub mod entities;
pub mod requests;

pub use entities::{ChatMessage, NewMessage};
pub use requests::{ChatStreamQuery, SendMessageRequest};
