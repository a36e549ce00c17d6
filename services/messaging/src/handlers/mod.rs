//! Write-side command handlers

pub mod mark_read;
pub mod send_message;
