use commerce_payments::domain::money::commission_minor;
use commerce_payments::domain::referral::{
    plan_for_amount, resolve_referral, AgentRef, PlanType, SellerRef,
};
use commerce_payments::repo::products_repo::stock_after;
use uuid::Uuid;

fn seller() -> SellerRef {
    SellerRef {
        seller_id: Uuid::new_v4(),
        token: "SLRAAAA111".to_string(),
    }
}

fn agent(linked: Option<Uuid>) -> AgentRef {
    AgentRef {
        agent_id: Uuid::new_v4(),
        code: "AGT42".to_string(),
        linked_seller_id: linked,
    }
}

#[test]
fn explicit_seller_token_is_authoritative() {
    let s = seller();
    let other_seller = Uuid::new_v4();
    let a = agent(Some(other_seller));

    let resolved = resolve_referral(Some(&s), Some(&a));
    // Even with a conflicting agent link, the explicit token wins the
    // seller leg; the agent keeps the agent leg.
    assert_eq!(resolved.seller_id, Some(s.seller_id));
    assert_eq!(resolved.agent_id, Some(a.agent_id));
}

#[test]
fn agent_without_seller_token_inherits_linked_seller() {
    let linked = Uuid::new_v4();
    let a = agent(Some(linked));

    let resolved = resolve_referral(None, Some(&a));
    assert_eq!(resolved.seller_id, Some(linked));
    assert_eq!(resolved.agent_id, Some(a.agent_id));
}

#[test]
fn unlinked_agent_yields_agent_leg_only() {
    let a = agent(None);
    let resolved = resolve_referral(None, Some(&a));
    assert_eq!(resolved.seller_id, None);
    assert_eq!(resolved.agent_id, Some(a.agent_id));
}

#[test]
fn no_referral_resolves_to_nothing() {
    let resolved = resolve_referral(None, None);
    assert_eq!(resolved.seller_id, None);
    assert_eq!(resolved.agent_id, None);
}

#[test]
fn order_at_ten_percent_accrues_exactly_one_hundred() {
    // 1000.00 order at the 10% rate earns 100.00.
    let amount = commission_minor(100000, 10.0);
    assert_eq!(amount, 10000);
}

#[test]
fn plan_tiers_follow_amount_thresholds() {
    assert_eq!(plan_for_amount(25_000_00).plan_type, PlanType::Unlimited);
    assert_eq!(plan_for_amount(30_000_00).plan_type, PlanType::Unlimited);

    let pro = plan_for_amount(20_000_00);
    assert_eq!(pro.plan_type, PlanType::Pro);
    assert_eq!(pro.agent_limit, 100);

    assert_eq!(plan_for_amount(15_000_00).plan_type, PlanType::Starter);
    assert_eq!(plan_for_amount(24_999_99).plan_type, PlanType::Pro);
    assert_eq!(plan_for_amount(19_999_99).plan_type, PlanType::Starter);
    assert_eq!(plan_for_amount(500_00).plan_type, PlanType::Starter);
}

#[test]
fn stock_decrement_floors_at_zero() {
    assert_eq!(stock_after(3, 3), (0, false));
    assert_eq!(stock_after(5, 2), (3, true));
    assert_eq!(stock_after(1, 4), (0, false));
    assert_eq!(stock_after(0, 1), (0, false));
}
