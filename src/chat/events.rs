use serde::{Deserialize, Serialize};

/// Inbound chat frame. Clients may still send a legacy `username` field;
/// it is ignored, the sender is always the authenticated session.
#[derive(Debug, Deserialize)]
pub struct InboundChat {
    pub message: String,
}

/// Domain events carried through the group registry. Each session type
/// matches the variants it knows how to deliver and skips the rest.
#[derive(Debug, Clone)]
pub enum Event {
    Chat {
        message: String,
        sender: String,
    },
    Notification {
        message: String,
        sender: Option<String>,
    },
}

/// Outbound frame for a conversation group member.
#[derive(Debug, Serialize)]
pub struct ChatFrame<'a> {
    pub message: &'a str,
    pub sender: &'a str,
}

/// Outbound frame for a notification listener. `sender` is absent for
/// system-originated notices.
#[derive(Debug, Serialize)]
pub struct NotificationFrame<'a> {
    pub message: &'a str,
    pub sender: Option<&'a str>,
}
