use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionType {
    Earned,
    Bonus,
    Deducted,
    Withdrawn,
}

impl CommissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionType::Earned => "EARNED",
            CommissionType::Bonus => "BONUS",
            CommissionType::Deducted => "DEDUCTED",
            CommissionType::Withdrawn => "WITHDRAWN",
        }
    }

    /// Only accrual entries incremented the party's counters at creation, so
    /// only they may be reversed through the cancel path. Withdrawal-linked
    /// entries already debited the balance when the request was made; the
    /// withdrawal rejection path refunds that debit and cancels the entry
    /// itself.
    pub fn reversible_on_cancel(&self) -> bool {
        matches!(self, CommissionType::Earned | CommissionType::Bonus)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl CommissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionStatus::Pending => "PENDING",
            CommissionStatus::Confirmed => "CONFIRMED",
            CommissionStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> CommissionStatus {
        match s {
            "CONFIRMED" => CommissionStatus::Confirmed,
            "CANCELLED" => CommissionStatus::Cancelled,
            _ => CommissionStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommissionEntry {
    pub entry_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub entry_type: CommissionType,
    pub amount_minor: i64,
    pub status: CommissionStatus,
    pub order_snapshot: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Failed,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "PENDING",
            WithdrawalStatus::Approved => "APPROVED",
            WithdrawalStatus::Rejected => "REJECTED",
            WithdrawalStatus::Completed => "COMPLETED",
            WithdrawalStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> WithdrawalStatus {
        match s {
            "APPROVED" => WithdrawalStatus::Approved,
            "REJECTED" => WithdrawalStatus::Rejected,
            "COMPLETED" => WithdrawalStatus::Completed,
            "FAILED" => WithdrawalStatus::Failed,
            _ => WithdrawalStatus::Pending,
        }
    }
}

/// Which storage schema a withdrawal came from. Callers never branch on
/// this; the repo uses it to route updates back to the right table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalSource {
    Current,
    Legacy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_holder: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub bank_name: Option<String>,
}

impl BankDetails {
    pub fn is_complete(&self) -> bool {
        let filled = |f: &Option<String>| f.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
        filled(&self.account_holder) && filled(&self.account_number) && filled(&self.ifsc_code)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Withdrawal {
    pub withdrawal_id: Uuid,
    pub source: WithdrawalSource,
    pub seller_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub amount_minor: i64,
    pub net_amount_minor: i64,
    pub status: WithdrawalStatus,
    pub bank_details: BankDetails,
    pub commission_entry_id: Option<Uuid>,
    pub processed_by: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalAction {
    Approve,
    Reject,
    Complete,
}

/// Legal transitions of the withdrawal state machine. Completion requires a
/// prior approval; everything else is only allowed from PENDING. Returns the
/// resulting status, or the unchanged current status as the error value so
/// callers can report it.
pub fn withdrawal_transition(
    current: WithdrawalStatus,
    action: WithdrawalAction,
) -> Result<WithdrawalStatus, WithdrawalStatus> {
    match (current, action) {
        (WithdrawalStatus::Pending, WithdrawalAction::Approve) => Ok(WithdrawalStatus::Approved),
        (WithdrawalStatus::Pending, WithdrawalAction::Reject) => Ok(WithdrawalStatus::Rejected),
        (WithdrawalStatus::Approved, WithdrawalAction::Complete) => Ok(WithdrawalStatus::Completed),
        _ => Err(current),
    }
}
