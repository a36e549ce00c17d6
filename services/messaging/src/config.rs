//! Messaging service configuration

#[derive(Debug, Clone)]
pub struct MessagingConfig {
    pub http_bind: String,
    /// Per-connection outbound buffer; an overflowing connection is dropped.
    pub ws_send_buffer: usize,
    /// Upper bound on a message body, in bytes after trimming.
    pub max_message_len: usize,
}

impl MessagingConfig {
    pub fn from_env() -> Self {
        Self {
            http_bind: std::env::var("HTTP_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            ws_send_buffer: std::env::var("WS_SEND_BUFFER")
                .unwrap_or_else(|_| "64".to_string())
                .parse()
                .unwrap_or(64),
            max_message_len: std::env::var("MAX_MESSAGE_LEN")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap_or(10000),
        }
    }
}
