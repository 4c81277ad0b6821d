//! Order status and caller role enums.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// `Initiated` is the sole initial state; `Delivered` and `Declined` are
/// terminal in the business sense, but no transition-adjacency rules are
/// enforced: an authorized caller may set any status to any other status.
///
/// The wire form matches the stored strings, including the space in
/// `"In Process"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Initiated,
    #[serde(rename = "In Process")]
    InProcess,
    Sent,
    Delivered,
    Declined,
}

impl OrderStatus {
    /// All five statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Initiated,
        Self::InProcess,
        Self::Sent,
        Self::Delivered,
        Self::Declined,
    ];

    /// Whether this status marks the end of the order's life.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Declined)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initiated => write!(f, "Initiated"),
            Self::InProcess => write!(f, "In Process"),
            Self::Sent => write!(f, "Sent"),
            Self::Delivered => write!(f, "Delivered"),
            Self::Declined => write!(f, "Declined"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Initiated" => Ok(Self::Initiated),
            "In Process" => Ok(Self::InProcess),
            "Sent" => Ok(Self::Sent),
            "Delivered" => Ok(Self::Delivered),
            "Declined" => Ok(Self::Declined),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Caller role attached to every authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full access to store management, including order transitions.
    Admin,
    /// A shopper; may create orders but not manage them.
    Customer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "Admin"),
            Self::Customer => write!(f, "Customer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Customer" => Ok(Self::Customer),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_form() {
        let json = serde_json::to_string(&OrderStatus::InProcess).unwrap();
        assert_eq!(json, "\"In Process\"");

        let parsed: OrderStatus = serde_json::from_str("\"Declined\"").unwrap();
        assert_eq!(parsed, OrderStatus::Declined);
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        let result: Result<OrderStatus, _> = serde_json::from_str("\"Shipped\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_status_display_from_str_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_default_is_initiated() {
        assert_eq!(OrderStatus::default(), OrderStatus::Initiated);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Declined.is_terminal());
        assert!(!OrderStatus::Initiated.is_terminal());
        assert!(!OrderStatus::Sent.is_terminal());
    }

    #[test]
    fn test_role_roundtrip() {
        let parsed: Role = "Admin".parse().unwrap();
        assert_eq!(parsed, Role::Admin);
        assert_eq!(Role::Customer.to_string(), "Customer");
        assert!("manager".parse::<Role>().is_err());
    }
}
