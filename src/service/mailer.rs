use crate::domain::money::format_rupees;
use crate::domain::order::OrderRecord;
use serde_json::json;

/// Order-confirmation email over an HTTP mail API. Strictly fire-and-forget:
/// a send failure is logged and the enclosing request never sees it.
#[derive(Clone)]
pub struct Mailer {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
    pub client: reqwest::Client,
}

impl Mailer {
    pub async fn send_order_confirmation(&self, order: &OrderRecord) {
        if self.api_url.is_empty() {
            tracing::debug!("mailer not configured, skipping confirmation email");
            return;
        }

        let (html, text) = render_confirmation(order);
        let payload = json!({
            "from": self.from_address,
            "to": order.customer.email,
            "subject": format!("Order confirmed: {}", order.transaction_id),
            "html": html,
            "text": text,
        });

        let result = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                tracing::warn!(
                    transaction_id = %order.transaction_id,
                    status = %resp.status(),
                    "confirmation email rejected by mail API"
                );
            }
            Err(e) => {
                tracing::warn!(
                    transaction_id = %order.transaction_id,
                    "confirmation email send failed: {}",
                    e
                );
            }
        }
    }
}

fn render_confirmation(order: &OrderRecord) -> (String, String) {
    let mut item_rows = String::new();
    let mut item_lines = String::new();
    for item in &order.items {
        item_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            item.name,
            item.quantity,
            format_rupees(item.unit_price_minor),
        ));
        item_lines.push_str(&format!(
            "- {} x{} @ {}\n",
            item.name,
            item.quantity,
            format_rupees(item.unit_price_minor),
        ));
    }

    let addr = &order.shipping_address;
    let address_line = format!(
        "{}, {}, {} {} ({})",
        addr.street, addr.city, addr.state, addr.pincode, addr.country
    );

    let html = format!(
        "<h2>Thank you, {}!</h2>\
         <p>Your order <b>{}</b> is confirmed.</p>\
         <table><tr><th>Item</th><th>Qty</th><th>Price</th></tr>{}</table>\
         <p>Total: <b>{}</b></p>\
         <p>Shipping to: {}</p>",
        order.customer.name,
        order.transaction_id,
        item_rows,
        format_rupees(order.total_amount_minor),
        address_line,
    );
    let text = format!(
        "Thank you, {}!\n\nYour order {} is confirmed.\n\n{}\nTotal: {}\nShipping to: {}\n",
        order.customer.name,
        order.transaction_id,
        item_lines,
        format_rupees(order.total_amount_minor),
        address_line,
    );
    (html, text)
}
