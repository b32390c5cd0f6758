/// Converts a decimal currency amount to integer minor units (paise),
/// rounding to the nearest subunit. Two-decimal inputs convert exactly:
/// 499.50 becomes 49950.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn from_minor_units(amount_minor: i64) -> f64 {
    amount_minor as f64 / 100.0
}

/// Commission on an order at a percent rate, rounded to the nearest paisa.
pub fn commission_minor(order_amount_minor: i64, rate_percent: f64) -> i64 {
    (order_amount_minor as f64 * rate_percent / 100.0).round() as i64
}

pub fn format_rupees(amount_minor: i64) -> String {
    format!("₹{:.2}", from_minor_units(amount_minor))
}
