use crate::domain::commission::{
    withdrawal_transition, CommissionStatus, CommissionType, Withdrawal, WithdrawalAction,
    WithdrawalStatus,
};
use crate::domain::money::{commission_minor, to_minor_units};
use crate::domain::order::{err, internal, ErrorEnvelope};
use crate::repo::agents_repo::AgentsRepo;
use crate::repo::commission_entries_repo::{CommissionEntriesRepo, NewEntry};
use crate::repo::sellers_repo::SellersRepo;
use crate::repo::settings_repo::SettingsRepo;
use crate::repo::withdrawals_repo::{NewWithdrawal, WithdrawalsRepo};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Clone)]
pub struct CommissionLedger {
    pub sellers_repo: SellersRepo,
    pub agents_repo: AgentsRepo,
    pub commission_entries_repo: CommissionEntriesRepo,
    pub withdrawals_repo: WithdrawalsRepo,
    pub settings_repo: SettingsRepo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalRequestBody {
    pub seller_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    /// Decimal rupees.
    pub amount: f64,
}

impl CommissionLedger {
    /// Confirms a pending accrual. Balances moved at accrual time, so this is
    /// a pure status transition.
    pub async fn confirm_entry(
        &self,
        entry_id: Uuid,
        admin_id: &str,
    ) -> Result<(), (StatusCode, ErrorEnvelope)> {
        let moved = self
            .commission_entries_repo
            .try_transition(entry_id, CommissionStatus::Confirmed, admin_id, None)
            .await
            .map_err(internal)?;

        if !moved {
            return Err(self.entry_state_error(entry_id).await);
        }
        Ok(())
    }

    /// Cancels a pending accrual and reverses the party's running counters.
    pub async fn cancel_entry(
        &self,
        entry_id: Uuid,
        admin_id: &str,
        reason: &str,
    ) -> Result<(), (StatusCode, ErrorEnvelope)> {
        let entry = self
            .commission_entries_repo
            .find(entry_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| (StatusCode::NOT_FOUND, err("ORDER_NOT_FOUND", "commission entry not found")))?;

        if !entry.entry_type.reversible_on_cancel() {
            return Err((
                StatusCode::BAD_REQUEST,
                err(
                    "INVALID_STATE",
                    &format!(
                        "{} entries cannot be cancelled here; reject the linked withdrawal instead",
                        entry.entry_type.as_str()
                    ),
                ),
            ));
        }

        let moved = self
            .commission_entries_repo
            .try_transition(entry_id, CommissionStatus::Cancelled, admin_id, Some(reason))
            .await
            .map_err(internal)?;

        if !moved {
            return Err(self.entry_state_error(entry_id).await);
        }

        if let Some(seller_id) = entry.seller_id {
            self.sellers_repo
                .reverse_commission(seller_id, entry.amount_minor)
                .await
                .map_err(internal)?;
        }
        if let Some(agent_id) = entry.agent_id {
            self.agents_repo
                .reverse_commission(agent_id, entry.amount_minor)
                .await
                .map_err(internal)?;
        }
        Ok(())
    }

    async fn entry_state_error(&self, entry_id: Uuid) -> (StatusCode, ErrorEnvelope) {
        let current = self
            .commission_entries_repo
            .find(entry_id)
            .await
            .ok()
            .flatten()
            .map(|e| e.status.as_str())
            .unwrap_or("MISSING");
        (
            StatusCode::BAD_REQUEST,
            err(
                "INVALID_STATE",
                &format!("commission entry is not pending (current state: {})", current),
            ),
        )
    }

    /// Creates a withdrawal request with an optimistic balance debit. The
    /// debit and the balance check are one conditional update, so the
    /// available balance can never go negative.
    pub async fn request_withdrawal(
        &self,
        body: WithdrawalRequestBody,
    ) -> Result<Withdrawal, (StatusCode, ErrorEnvelope)> {
        let amount_minor = to_minor_units(body.amount);
        if amount_minor <= 0 {
            return Err((
                StatusCode::BAD_REQUEST,
                err("VALIDATION_ERROR", "withdrawal amount must be greater than zero"),
            ));
        }

        let (bank_details, debited) = match (body.seller_id, body.agent_id) {
            (Some(seller_id), None) => {
                let seller = self
                    .sellers_repo
                    .find_by_id(seller_id)
                    .await
                    .map_err(internal)?
                    .ok_or_else(|| {
                        (StatusCode::NOT_FOUND, err("ORDER_NOT_FOUND", "seller not found"))
                    })?;
                if !seller.bank_details.is_complete() {
                    return Err((
                        StatusCode::BAD_REQUEST,
                        err("INCOMPLETE_BANK_DETAILS", "bank account details are incomplete"),
                    ));
                }
                let ok = self
                    .sellers_repo
                    .try_debit_available(seller_id, amount_minor)
                    .await
                    .map_err(internal)?;
                (seller.bank_details, ok)
            }
            (None, Some(agent_id)) => {
                let agent = self
                    .agents_repo
                    .find_by_id(agent_id)
                    .await
                    .map_err(internal)?
                    .ok_or_else(|| {
                        (StatusCode::NOT_FOUND, err("ORDER_NOT_FOUND", "agent not found"))
                    })?;
                if !agent.bank_details.is_complete() {
                    return Err((
                        StatusCode::BAD_REQUEST,
                        err("INCOMPLETE_BANK_DETAILS", "bank account details are incomplete"),
                    ));
                }
                let ok = self
                    .agents_repo
                    .try_debit_available(agent_id, amount_minor)
                    .await
                    .map_err(internal)?;
                (agent.bank_details, ok)
            }
            _ => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    err("VALIDATION_ERROR", "exactly one of seller_id or agent_id is required"),
                ));
            }
        };

        if !debited {
            return Err((
                StatusCode::BAD_REQUEST,
                err("INSUFFICIENT_BALANCE", "withdrawal amount exceeds available commission"),
            ));
        }

        let fee_rate = self.settings_repo.withdrawal_fee_rate().await.map_err(internal)?;
        let net_amount_minor = amount_minor - commission_minor(amount_minor, fee_rate);

        let entry_id = self
            .commission_entries_repo
            .insert(&NewEntry {
                seller_id: body.seller_id,
                agent_id: body.agent_id,
                order_id: None,
                entry_type: CommissionType::Withdrawn,
                amount_minor,
                status: CommissionStatus::Pending,
                order_snapshot: None,
            })
            .await
            .map_err(internal)?;

        let withdrawal_id = self
            .withdrawals_repo
            .insert(&NewWithdrawal {
                seller_id: body.seller_id,
                agent_id: body.agent_id,
                amount_minor,
                net_amount_minor,
                bank_details,
                commission_entry_id: Some(entry_id),
            })
            .await
            .map_err(internal)?;

        self.withdrawals_repo
            .find(withdrawal_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| internal(anyhow::anyhow!("withdrawal vanished after insert")))
    }

    pub async fn approve_withdrawal(
        &self,
        withdrawal_id: Uuid,
        admin_id: &str,
    ) -> Result<Withdrawal, (StatusCode, ErrorEnvelope)> {
        self.transition(withdrawal_id, WithdrawalAction::Approve, admin_id)
            .await
    }

    pub async fn complete_withdrawal(
        &self,
        withdrawal_id: Uuid,
        admin_id: &str,
    ) -> Result<Withdrawal, (StatusCode, ErrorEnvelope)> {
        self.transition(withdrawal_id, WithdrawalAction::Complete, admin_id)
            .await
    }

    /// Rejection refunds the debited amount and cancels the linked ledger
    /// entry, so rejected requests leave no trace in the balances.
    pub async fn reject_withdrawal(
        &self,
        withdrawal_id: Uuid,
        admin_id: &str,
    ) -> Result<Withdrawal, (StatusCode, ErrorEnvelope)> {
        let withdrawal = self
            .transition(withdrawal_id, WithdrawalAction::Reject, admin_id)
            .await?;

        if let Some(seller_id) = withdrawal.seller_id {
            self.sellers_repo
                .refund_available(seller_id, withdrawal.amount_minor)
                .await
                .map_err(internal)?;
        }
        if let Some(agent_id) = withdrawal.agent_id {
            self.agents_repo
                .refund_available(agent_id, withdrawal.amount_minor)
                .await
                .map_err(internal)?;
        }
        if let Some(entry_id) = withdrawal.commission_entry_id {
            let cancelled = self
                .commission_entries_repo
                .try_transition(entry_id, CommissionStatus::Cancelled, admin_id, Some("withdrawal rejected"))
                .await
                .map_err(internal)?;
            if !cancelled {
                tracing::warn!(
                    withdrawal_id = %withdrawal_id,
                    entry_id = %entry_id,
                    "linked ledger entry was not pending at rejection time"
                );
            }
        }

        Ok(withdrawal)
    }

    async fn transition(
        &self,
        withdrawal_id: Uuid,
        action: WithdrawalAction,
        admin_id: &str,
    ) -> Result<Withdrawal, (StatusCode, ErrorEnvelope)> {
        let withdrawal = self
            .withdrawals_repo
            .find(withdrawal_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| {
                (StatusCode::NOT_FOUND, err("ORDER_NOT_FOUND", "withdrawal not found"))
            })?;

        let next = withdrawal_transition(withdrawal.status, action).map_err(|current| {
            (
                StatusCode::BAD_REQUEST,
                err(
                    "INVALID_STATE",
                    &format!("withdrawal cannot move from state {}", current.as_str()),
                ),
            )
        })?;

        let moved = self
            .withdrawals_repo
            .try_transition(withdrawal_id, withdrawal.source, withdrawal.status, next, admin_id)
            .await
            .map_err(internal)?;

        if !moved {
            // Lost a race with another admin action; report the fresh state.
            let current = self
                .withdrawals_repo
                .find(withdrawal_id)
                .await
                .map_err(internal)?
                .map(|w| w.status.as_str())
                .unwrap_or("MISSING");
            return Err((
                StatusCode::BAD_REQUEST,
                err(
                    "INVALID_STATE",
                    &format!("withdrawal cannot move from state {}", current),
                ),
            ));
        }

        Ok(Withdrawal {
            status: next,
            ..withdrawal
        })
    }
}
