//! Order status.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Orders are created as `Pending`; an admin may move them in any direction.
/// `Delivered` is the only state in which an order may be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    OnTheWay,
    Delivered,
}

impl OrderStatus {
    /// All valid statuses, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::OnTheWay, Self::Delivered];

    /// Whether an order in this status may be deleted.
    #[must_use]
    pub const fn deletable(self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::OnTheWay => write!(f, "on_the_way"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "on_the_way" => Ok(Self::OnTheWay),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_str_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
        assert!("PENDING".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_wire_values() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OnTheWay).unwrap(),
            "\"on_the_way\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(parsed, OrderStatus::Delivered);
        assert!(serde_json::from_str::<OrderStatus>("\"cancelled\"").is_err());
    }

    #[test]
    fn test_only_delivered_is_deletable() {
        assert!(!OrderStatus::Pending.deletable());
        assert!(!OrderStatus::OnTheWay.deletable());
        assert!(OrderStatus::Delivered.deletable());
    }

    #[test]
    fn test_default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }
}
