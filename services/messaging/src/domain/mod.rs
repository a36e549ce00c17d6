//! Domain module
//!
//! The messaging domain types live in `bazaar-chat-sdk` so other services
//! (and clients) can share the wire shapes; this module is the service's
//! view of them.

pub use bazaar_chat_sdk::conversation::{Conversation, ConversationKey};
pub use bazaar_chat_sdk::message::{Message, ReadReceipt};
pub use bazaar_chat_sdk::view::{ConversationSummary, ListingSummary, UserProfile};
