use crate::domain::commission::{CommissionStatus, CommissionType};
use crate::domain::money::commission_minor;
use crate::domain::order::{OrderRecord, OrderType};
use crate::domain::referral::{plan_for_amount, resolve_referral};
use crate::repo::agents_repo::AgentsRepo;
use crate::repo::commission_entries_repo::{CommissionEntriesRepo, NewEntry};
use crate::repo::products_repo::ProductsRepo;
use crate::repo::sellers_repo::SellersRepo;
use crate::repo::settings_repo::SettingsRepo;
use crate::service::mailer::Mailer;
use crate::service::order_mirror::OrderMirror;

/// Post-payment side-effect pipeline. Runs once per order: the caller gates
/// it behind the conditional payment-status update, because stock decrement
/// is not idempotent. Steps are best-effort; the payment is already captured,
/// so one failing step is logged and the rest still run.
#[derive(Clone)]
pub struct OrderFinalizer {
    pub products_repo: ProductsRepo,
    pub sellers_repo: SellersRepo,
    pub agents_repo: AgentsRepo,
    pub commission_entries_repo: CommissionEntriesRepo,
    pub settings_repo: SettingsRepo,
    pub order_mirror: OrderMirror,
    pub mailer: Mailer,
}

impl OrderFinalizer {
    pub async fn finalize(&self, order: &OrderRecord) {
        match order.order_type {
            OrderType::PlanPurchase => {
                if let Err(e) = self.activate_plan(order).await {
                    tracing::warn!(
                        transaction_id = %order.transaction_id,
                        "plan activation failed: {:#}",
                        e
                    );
                }
            }
            OrderType::ProductOrder => {
                if let Err(e) = self.accrue_commission(order).await {
                    tracing::warn!(
                        transaction_id = %order.transaction_id,
                        "commission accrual failed: {:#}",
                        e
                    );
                }
                self.decrement_stock(order).await;
            }
        }

        if let Err(e) = self.order_mirror.upsert(order).await {
            tracing::warn!(
                transaction_id = %order.transaction_id,
                "order mirror write failed: {:#}",
                e
            );
        }

        // Fire-and-forget; a lost confirmation email never fails the order.
        self.mailer.send_order_confirmation(order).await;
    }

    /// Plan purchase: promote the matching pending registration into an
    /// active seller, or upgrade an existing seller's plan in place when no
    /// registration is found.
    async fn activate_plan(&self, order: &OrderRecord) -> anyhow::Result<()> {
        let plan = plan_for_amount(order.total_amount_minor);

        let registration = self
            .sellers_repo
            .find_pending_registration(&order.transaction_id, &order.customer.email)
            .await?;

        match registration {
            Some(registration) => {
                let seller_id = self.sellers_repo.promote_registration(&registration, plan).await?;
                tracing::info!(
                    transaction_id = %order.transaction_id,
                    seller_id = %seller_id,
                    plan = plan.plan_type.as_str(),
                    "pending registration promoted to active seller"
                );
            }
            None => match self.sellers_repo.find_by_email(&order.customer.email).await? {
                Some(seller) => {
                    self.sellers_repo.upgrade_plan(seller.seller_id, plan).await?;
                    tracing::info!(
                        seller_id = %seller.seller_id,
                        plan = plan.plan_type.as_str(),
                        "existing seller plan upgraded"
                    );
                }
                None => {
                    tracing::warn!(
                        transaction_id = %order.transaction_id,
                        email = %order.customer.email,
                        "plan purchase with no matching registration or seller"
                    );
                }
            },
        }

        Ok(())
    }

    async fn accrue_commission(&self, order: &OrderRecord) -> anyhow::Result<()> {
        if order.seller_token.is_none() && order.agent_code.is_none() {
            return Ok(());
        }

        let seller = match &order.seller_token {
            Some(token) => self.sellers_repo.find_by_token(token).await?,
            None => None,
        };
        let agent = match &order.agent_code {
            Some(code) => self.agents_repo.find_by_code(code).await?,
            None => None,
        };
        let resolved = resolve_referral(seller.as_ref(), agent.as_ref());

        let snapshot = serde_json::json!({
            "transaction_id": order.transaction_id,
            "customer_name": order.customer.name,
            "total_amount_minor": order.total_amount_minor,
            "items": order.items.iter().map(|i| &i.name).collect::<Vec<_>>(),
        });

        if let Some(seller_id) = resolved.seller_id {
            let rate = self.settings_repo.seller_commission_rate().await?;
            let amount = commission_minor(order.total_amount_minor, rate);
            self.commission_entries_repo
                .insert(&NewEntry {
                    seller_id: Some(seller_id),
                    agent_id: None,
                    order_id: Some(order.order_id),
                    entry_type: CommissionType::Earned,
                    amount_minor: amount,
                    status: CommissionStatus::Pending,
                    order_snapshot: Some(snapshot.clone()),
                })
                .await?;
            self.sellers_repo.add_commission(seller_id, amount).await?;
            tracing::info!(
                transaction_id = %order.transaction_id,
                seller_id = %seller_id,
                amount_minor = amount,
                "seller commission accrued"
            );
        }

        if let Some(agent_id) = resolved.agent_id {
            let rate = self.settings_repo.agent_commission_rate().await?;
            let amount = commission_minor(order.total_amount_minor, rate);
            self.commission_entries_repo
                .insert(&NewEntry {
                    seller_id: None,
                    agent_id: Some(agent_id),
                    order_id: Some(order.order_id),
                    entry_type: CommissionType::Earned,
                    amount_minor: amount,
                    status: CommissionStatus::Pending,
                    order_snapshot: Some(snapshot),
                })
                .await?;
            self.agents_repo.add_commission(agent_id, amount).await?;
            tracing::info!(
                transaction_id = %order.transaction_id,
                agent_id = %agent_id,
                amount_minor = amount,
                "agent commission accrued"
            );
        }

        Ok(())
    }

    async fn decrement_stock(&self, order: &OrderRecord) {
        for item in &order.items {
            let Some(product_id) = item.product_id else {
                continue;
            };
            match self.products_repo.decrement_stock(product_id, item.quantity).await {
                Ok(Some(stock)) => {
                    if !stock.in_stock {
                        tracing::info!(product_id = %product_id, "product out of stock");
                    }
                }
                Ok(None) => {
                    tracing::warn!(product_id = %product_id, "ordered product no longer exists");
                }
                Err(e) => {
                    tracing::warn!(product_id = %product_id, "stock decrement failed: {:#}", e);
                }
            }
        }
    }
}
