//! Canonical group naming. Pure functions; both ends of a conversation
//! must arrive at the same name no matter who connects first.

use uuid::Uuid;

/// Group name for the private conversation between two handles. The pair
/// is sorted so the name is independent of argument order. Handles are
/// word-characters only (enforced by the user directory), so distinct
/// pairs cannot collide.
pub fn conversation_group(a: &str, b: &str) -> String {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    format!("pm_{first}_{second}")
}

/// Personal out-of-band channel for one user, keyed on the stable id so
/// the name survives handle changes.
pub fn notification_group(user_id: &Uuid) -> String {
    format!("user_{user_id}")
}
