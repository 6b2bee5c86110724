//! Order and payment status, and the allowed order status transitions

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kitchen-facing status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProgress,
    Ready,
    Completed,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InProgress,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Canceled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Canceled => "canceled",
        }
    }

    /// Whether the order still occupies its table
    pub const fn is_active(&self) -> bool {
        !matches!(self, OrderStatus::Completed | OrderStatus::Canceled)
    }
}

/// Payment state, settable independently of the order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

/// Payment is collected by staff at the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
        }
    }
}

/// Unrecognized status string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownStatus {
                kind: "order status",
                value: s.to_string(),
            })
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownStatus {
                kind: "payment status",
                value: s.to_string(),
            })
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            _ => Err(UnknownStatus {
                kind: "payment method",
                value: s.to_string(),
            }),
        }
    }
}

// Row decoding goes through `#[sqlx(try_from = "String")]`
impl TryFrom<String> for OrderStatus {
    type Error = UnknownStatus;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = UnknownStatus;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = UnknownStatus;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed order status transitions
///
/// Statuses without an entry are terminal. A status never transitions to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    edges: HashMap<OrderStatus, Vec<OrderStatus>>,
}

impl TransitionTable {
    /// pending → confirmed → in_progress → ready → completed, and
    /// canceled from any status before ready
    pub fn standard() -> Self {
        use OrderStatus::*;

        let edges = HashMap::from([
            (Pending, vec![Confirmed, Canceled]),
            (Confirmed, vec![InProgress, Canceled]),
            (InProgress, vec![Ready, Canceled]),
            (Ready, vec![Completed]),
        ]);
        Self { edges }
    }

    /// Statuses reachable in one step from `from`
    pub fn allowed(&self, from: OrderStatus) -> &[OrderStatus] {
        self.edges.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn can_transition(&self, from: OrderStatus, to: OrderStatus) -> bool {
        from != to && self.allowed(from).contains(&to)
    }

    pub fn is_terminal(&self, status: OrderStatus) -> bool {
        self.allowed(status).is_empty()
    }

    /// Same as [`can_transition`](Self::can_transition) but yields the API error
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), AppError> {
        if self.can_transition(from, to) {
            return Ok(());
        }
        Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Invalid status transition from {from} to {to}"),
        )
        .with_detail("from", from.as_str())
        .with_detail("to", to.as_str()))
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionParseError {
    #[error("malformed transition rule '{0}', expected 'from:to|to'")]
    Malformed(String),
    #[error(transparent)]
    Status(#[from] UnknownStatus),
}

/// Parses `pending:confirmed|canceled;confirmed:in_progress|canceled;...`
impl FromStr for TransitionTable {
    type Err = TransitionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut edges: HashMap<OrderStatus, Vec<OrderStatus>> = HashMap::new();
        for rule in s.split(';').map(str::trim).filter(|r| !r.is_empty()) {
            let (from, targets) = rule
                .split_once(':')
                .ok_or_else(|| TransitionParseError::Malformed(rule.to_string()))?;
            let from: OrderStatus = from.trim().parse()?;
            let entry = edges.entry(from).or_default();
            for to in targets.split('|').map(str::trim).filter(|t| !t.is_empty()) {
                let to: OrderStatus = to.parse()?;
                if to != from && !entry.contains(&to) {
                    entry.push(to);
                }
            }
        }
        Ok(Self { edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_standard_forward_path() {
        let table = TransitionTable::standard();
        assert!(table.can_transition(Pending, Confirmed));
        assert!(table.can_transition(Confirmed, InProgress));
        assert!(table.can_transition(InProgress, Ready));
        assert!(table.can_transition(Ready, Completed));
    }

    #[test]
    fn test_cancel_only_before_ready() {
        let table = TransitionTable::standard();
        assert!(table.can_transition(Pending, Canceled));
        assert!(table.can_transition(Confirmed, Canceled));
        assert!(table.can_transition(InProgress, Canceled));
        assert!(!table.can_transition(Ready, Canceled));
    }

    #[test]
    fn test_every_pair_outside_table_is_rejected() {
        let table = TransitionTable::standard();
        let allowed = [
            (Pending, Confirmed),
            (Pending, Canceled),
            (Confirmed, InProgress),
            (Confirmed, Canceled),
            (InProgress, Ready),
            (InProgress, Canceled),
            (Ready, Completed),
        ];
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert_eq!(
                    table.can_transition(from, to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_statuses() {
        let table = TransitionTable::standard();
        assert!(table.is_terminal(Completed));
        assert!(table.is_terminal(Canceled));
        assert!(!table.is_terminal(Ready));
    }

    #[test]
    fn test_check_error_carries_from_and_to() {
        let err = TransitionTable::standard()
            .check(Completed, Pending)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
        assert_eq!(
            err.message,
            "Invalid status transition from completed to pending"
        );
        let details = err.details.unwrap();
        assert_eq!(details["from"], "completed");
        assert_eq!(details["to"], "pending");
    }

    #[test]
    fn test_parse_matches_standard() {
        let parsed: TransitionTable =
            "pending:confirmed|canceled; confirmed:in_progress|canceled;in_progress:ready|canceled;ready:completed"
                .parse()
                .unwrap();
        assert_eq!(parsed, TransitionTable::standard());
    }

    #[test]
    fn test_parse_custom_table() {
        let table: TransitionTable = "pending:ready|pending;ready:completed".parse().unwrap();
        assert!(table.can_transition(Pending, Ready));
        assert!(!table.can_transition(Pending, Pending));
        assert!(!table.can_transition(Pending, Confirmed));
        assert!(table.is_terminal(Confirmed));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "pending".parse::<TransitionTable>(),
            Err(TransitionParseError::Malformed(_))
        ));
        assert!(matches!(
            "pending:shipped".parse::<TransitionTable>(),
            Err(TransitionParseError::Status(_))
        ));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!("in_progress".parse::<OrderStatus>().unwrap(), InProgress);
        assert!("cancelled".parse::<OrderStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            "refunded".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::Refunded
        );
        assert_eq!(PaymentMethod::default().as_str(), "cash");
    }
}
