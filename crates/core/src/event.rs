//! Invalidation-channel message shapes.
//!
//! The real-time channel is a pure invalidation signal: events tell a client
//! that a server-side collection changed and it should refetch. They carry no
//! payload data, with the single exception of the visitor tally.

use serde::{Deserialize, Serialize};

/// A message broadcast to every connected client.
///
/// Wire shapes (exactly):
/// - `{"type":"hello"}`
/// - `{"type":"products_changed"}`
/// - `{"type":"orders_changed"}`
/// - `{"type":"users_count","totalUsers":n}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// Sent once on connect.
    Hello,
    /// The product collection changed; refetch it.
    ProductsChanged,
    /// The order collection changed; refetch it.
    OrdersChanged,
    /// The visitor counter ticked.
    UsersCount {
        #[serde(rename = "totalUsers")]
        total_users: i64,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shapes() {
        assert_eq!(
            serde_json::to_string(&ChangeEvent::Hello).unwrap(),
            r#"{"type":"hello"}"#
        );
        assert_eq!(
            serde_json::to_string(&ChangeEvent::ProductsChanged).unwrap(),
            r#"{"type":"products_changed"}"#
        );
        assert_eq!(
            serde_json::to_string(&ChangeEvent::OrdersChanged).unwrap(),
            r#"{"type":"orders_changed"}"#
        );
        assert_eq!(
            serde_json::to_string(&ChangeEvent::UsersCount { total_users: 41 }).unwrap(),
            r#"{"type":"users_count","totalUsers":41}"#
        );
    }

    #[test]
    fn test_parse_roundtrip() {
        let event: ChangeEvent = serde_json::from_str(r#"{"type":"orders_changed"}"#).unwrap();
        assert_eq!(event, ChangeEvent::OrdersChanged);

        let event: ChangeEvent =
            serde_json::from_str(r#"{"type":"users_count","totalUsers":7}"#).unwrap();
        assert_eq!(event, ChangeEvent::UsersCount { total_users: 7 });
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(serde_json::from_str::<ChangeEvent>(r#"{"type":"reboot"}"#).is_err());
    }
}
