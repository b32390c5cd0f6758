use commerce_payments::domain::commission::{
    withdrawal_transition, BankDetails, CommissionType, WithdrawalAction, WithdrawalStatus,
};

#[test]
fn pending_can_be_approved_or_rejected() {
    assert_eq!(
        withdrawal_transition(WithdrawalStatus::Pending, WithdrawalAction::Approve),
        Ok(WithdrawalStatus::Approved)
    );
    assert_eq!(
        withdrawal_transition(WithdrawalStatus::Pending, WithdrawalAction::Reject),
        Ok(WithdrawalStatus::Rejected)
    );
}

#[test]
fn completion_requires_prior_approval() {
    assert_eq!(
        withdrawal_transition(WithdrawalStatus::Approved, WithdrawalAction::Complete),
        Ok(WithdrawalStatus::Completed)
    );
    assert_eq!(
        withdrawal_transition(WithdrawalStatus::Pending, WithdrawalAction::Complete),
        Err(WithdrawalStatus::Pending)
    );
}

#[test]
fn terminal_states_admit_no_action() {
    for terminal in [
        WithdrawalStatus::Rejected,
        WithdrawalStatus::Completed,
        WithdrawalStatus::Failed,
    ] {
        for action in [
            WithdrawalAction::Approve,
            WithdrawalAction::Reject,
            WithdrawalAction::Complete,
        ] {
            assert_eq!(withdrawal_transition(terminal, action), Err(terminal));
        }
    }
}

#[test]
fn approved_cannot_be_rejected() {
    // Rejection refunds the balance; allowing it after approval would let
    // an admin refund a payout already in flight.
    assert_eq!(
        withdrawal_transition(WithdrawalStatus::Approved, WithdrawalAction::Reject),
        Err(WithdrawalStatus::Approved)
    );
}

#[test]
fn only_accrual_entries_are_cancellable() {
    // Requesting a withdrawal of 100 debits the available balance and leaves
    // a WITHDRAWN/PENDING entry behind. Reversing that entry through the
    // cancel path would subtract the 100 a second time, so the cancel path
    // must refuse it; the rejection path refunds instead.
    assert!(CommissionType::Earned.reversible_on_cancel());
    assert!(CommissionType::Bonus.reversible_on_cancel());
    assert!(!CommissionType::Withdrawn.reversible_on_cancel());
    assert!(!CommissionType::Deducted.reversible_on_cancel());
}

#[test]
fn bank_details_completeness() {
    let full = BankDetails {
        account_holder: Some("Asha Patel".to_string()),
        account_number: Some("1234567890".to_string()),
        ifsc_code: Some("HDFC0000123".to_string()),
        bank_name: Some("HDFC".to_string()),
    };
    assert!(full.is_complete());

    let missing_ifsc = BankDetails {
        ifsc_code: None,
        ..full.clone()
    };
    assert!(!missing_ifsc.is_complete());

    let blank_account = BankDetails {
        account_number: Some("   ".to_string()),
        ..full
    };
    assert!(!blank_account.is_complete());
}

#[test]
fn status_strings_round_trip() {
    for status in [
        WithdrawalStatus::Pending,
        WithdrawalStatus::Approved,
        WithdrawalStatus::Rejected,
        WithdrawalStatus::Completed,
        WithdrawalStatus::Failed,
    ] {
        assert_eq!(WithdrawalStatus::parse(status.as_str()), status);
    }
}
