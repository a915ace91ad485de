use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope returned by every statement endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ParseResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ParseResponse {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Statement fields, named as the completion prompt asks for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditCardInfo {
    pub card_last_4: Option<String>,
    pub card_variant: Option<String>,
    pub billing_cycle: Option<String>,
    pub payment_due_date: Option<String>,
    pub total_due_amount: Option<String>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<String>,
}

impl CreditCardInfo {
    pub fn is_empty(&self) -> bool {
        self.card_last_4.is_none()
            && self.card_variant.is_none()
            && self.billing_cycle.is_none()
            && self.payment_due_date.is_none()
            && self.total_due_amount.is_none()
            && self.transactions.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}
