use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProductsRepo {
    pub pool: PgPool,
}

#[derive(Debug, Clone)]
pub struct ProductStock {
    pub product_id: Uuid,
    pub stock: i32,
    pub in_stock: bool,
}

/// Stock decrement floored at zero; the bool is the resulting in-stock flag.
/// `decrement_stock` persists exactly what this returns.
pub fn stock_after(stock: i32, quantity: i32) -> (i32, bool) {
    let next = (stock - quantity).max(0);
    (next, next > 0)
}

impl ProductsRepo {
    pub async fn find_stock(&self, product_id: Uuid) -> Result<Option<ProductStock>> {
        let row = sqlx::query("SELECT product_id, stock, in_stock FROM products WHERE product_id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| ProductStock {
            product_id: r.get("product_id"),
            stock: r.get("stock"),
            in_stock: r.get("in_stock"),
        }))
    }

    /// Decrements stock through `stock_after` under a row lock, so the
    /// persisted value and flag come from the one shared rule. Not
    /// idempotent; the finalize-once guard upstream is what keeps a replayed
    /// webhook from decrementing twice.
    pub async fn decrement_stock(&self, product_id: Uuid, quantity: i32) -> Result<Option<ProductStock>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT stock FROM products WHERE product_id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let (stock, in_stock) = stock_after(row.get("stock"), quantity);

        sqlx::query("UPDATE products SET stock = $2, in_stock = $3 WHERE product_id = $1")
            .bind(product_id)
            .bind(stock)
            .bind(in_stock)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(ProductStock {
            product_id,
            stock,
            in_stock,
        }))
    }
}
