//! Payment ledger records

use crate::domain::ids::{AppointmentId, PaymentId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a payment was (or will be) made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Card,
    Insurance,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Insurance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Insurance => "Insurance",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                format!("Invalid payment method '{s}'. Must be one of: Cash, Card, Insurance")
            })
    }
}

/// Whether a payment has been settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "Unpaid",
            Self::Paid => "Paid",
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unpaid" => Ok(Self::Unpaid),
            "Paid" => Ok(Self::Paid),
            _ => Err(format!(
                "Invalid payment status '{s}'. Must be one of: Unpaid, Paid"
            )),
        }
    }
}

/// A stored payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub appointment_id: AppointmentId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated payment fields
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDraft {
    pub appointment_id: AppointmentId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
}

impl From<&Payment> for PaymentDraft {
    fn from(payment: &Payment) -> Self {
        Self {
            appointment_id: payment.appointment_id,
            amount: payment.amount,
            method: payment.method,
            status: payment.status,
        }
    }
}

/// Payment fields exactly as submitted by a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentInput {
    pub appointment_id: Option<i64>,
    pub amount: Option<String>,
    pub method: Option<String>,
    pub status: Option<String>,
}

impl From<&Payment> for PaymentInput {
    fn from(payment: &Payment) -> Self {
        Self {
            appointment_id: Some(payment.appointment_id.value()),
            amount: Some(payment.amount.to_string()),
            method: Some(payment.method.to_string()),
            status: Some(payment.status.to_string()),
        }
    }
}
