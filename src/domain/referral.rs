use serde::Serialize;
use uuid::Uuid;

/// Directory rows as the finalizer sees them; the repo layer fills these in.
#[derive(Debug, Clone)]
pub struct SellerRef {
    pub seller_id: Uuid,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct AgentRef {
    pub agent_id: Uuid,
    pub code: String,
    pub linked_seller_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReferral {
    pub seller_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
}

/// Deterministic referral resolution. An explicit seller token is
/// authoritative; the agent code only ever adds the agent leg. When the order
/// carries an agent code but no seller token, the agent's linked seller
/// inherits the seller leg.
pub fn resolve_referral(
    seller_by_token: Option<&SellerRef>,
    agent_by_code: Option<&AgentRef>,
) -> ResolvedReferral {
    let agent_id = agent_by_code.map(|a| a.agent_id);
    let seller_id = match seller_by_token {
        Some(s) => Some(s.seller_id),
        None => agent_by_code.and_then(|a| a.linked_seller_id),
    };
    ResolvedReferral { seller_id, agent_id }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    Starter,
    Pro,
    Unlimited,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Starter => "STARTER",
            PlanType::Pro => "PRO",
            PlanType::Unlimited => "UNLIMITED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub plan_type: PlanType,
    pub agent_limit: i32,
}

/// Plan tier from the total amount paid, in minor units. Thresholds are
/// whole-rupee figures from the pricing page.
pub fn plan_for_amount(total_amount_minor: i64) -> Plan {
    if total_amount_minor >= 25_000_00 {
        Plan {
            plan_type: PlanType::Unlimited,
            agent_limit: 100_000,
        }
    } else if total_amount_minor >= 20_000_00 {
        Plan {
            plan_type: PlanType::Pro,
            agent_limit: 100,
        }
    } else {
        Plan {
            plan_type: PlanType::Starter,
            agent_limit: 25,
        }
    }
}
