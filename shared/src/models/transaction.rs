//! Ledger transaction models

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock-affecting business event types
///
/// The sign each type applies to the stock quantity is a fixed table, never
/// inferred from context: sales and damage write-offs subtract, purchases
/// and inbound transfers add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Sale,
    Purchase,
    Damage,
    Transfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 4] = [
        TransactionType::Sale,
        TransactionType::Purchase,
        TransactionType::Damage,
        TransactionType::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Sale => "sale",
            TransactionType::Purchase => "purchase",
            TransactionType::Damage => "damage",
            TransactionType::Transfer => "transfer",
        }
    }

    /// Signed stock delta for a positive quantity magnitude
    pub fn signed_delta(&self, quantity: Decimal) -> Decimal {
        match self {
            TransactionType::Sale | TransactionType::Damage => -quantity,
            TransactionType::Purchase | TransactionType::Transfer => quantity,
        }
    }

    /// True for types that add stock
    pub fn is_inbound(&self) -> bool {
        matches!(self, TransactionType::Purchase | TransactionType::Transfer)
    }
}

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(TransactionType::Sale),
            "purchase" => Ok(TransactionType::Purchase),
            "damage" => Ok(TransactionType::Damage),
            "transfer" => Ok(TransactionType::Transfer),
            other => Err(UnknownTransactionType(other.to_string())),
        }
    }
}

/// Error for an unrecognized transaction type string
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown transaction type: {0}")]
pub struct UnknownTransactionType(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_sale_subtracts() {
        assert_eq!(TransactionType::Sale.signed_delta(dec(5)), dec(-5));
    }

    #[test]
    fn test_damage_subtracts() {
        assert_eq!(TransactionType::Damage.signed_delta(dec(3)), dec(-3));
    }

    #[test]
    fn test_purchase_adds() {
        assert_eq!(TransactionType::Purchase.signed_delta(dec(10)), dec(10));
    }

    #[test]
    fn test_transfer_adds() {
        assert_eq!(TransactionType::Transfer.signed_delta(dec(7)), dec(7));
    }

    #[test]
    fn test_round_trip_strings() {
        for t in TransactionType::ALL {
            assert_eq!(t.as_str().parse::<TransactionType>().unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!("refund".parse::<TransactionType>().is_err());
    }
}
