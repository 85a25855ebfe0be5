use sowcraft_core::{PricingPolicy, PricingSummary, PricingTableBlock, round_to_increment};

/// Money figures for a pricing table:
/// subtotal → discount → after discount → GST → grand total → rounded total.
pub fn summarize(block: &PricingTableBlock, policy: &PricingPolicy) -> PricingSummary {
    let subtotal = block.subtotal();
    let discount_amount = subtotal * block.discount_percent / 100.0;
    let after_discount = subtotal - discount_amount;
    let gst = after_discount * policy.gst_rate;
    let grand_total = after_discount + gst;

    PricingSummary {
        subtotal,
        discount_percent: block.discount_percent,
        discount_amount,
        after_discount,
        gst,
        grand_total,
        rounded_total: round_to_increment(grand_total, policy.rounding_increment),
    }
}
