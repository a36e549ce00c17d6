//! Bazaar Chat SDK
//!
//! Domain and protocol types for the marketplace messaging core.

pub mod conversation;
pub mod message;
pub mod view;


pub use conversation::{Conversation, ConversationKey};
pub use message::{Message, ReadReceipt};
pub use view::{ConversationSummary, ListingSummary, UserProfile};
