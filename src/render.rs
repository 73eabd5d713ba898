use std::fmt::Write;

use crate::domain::{Order, Product};

const SEPARATOR: &str = "\n───────────────\n";

/// Layout variant of the chat message. Each delivery target picks one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderStyle {
    #[default]
    Verbose,
    Debug,
}

/// Formats an order as a single chat message. Pure and total: the header and
/// created-at lines are always present, even without products.
pub fn render(order: &Order, style: RenderStyle) -> String {
    let mut message = String::from("📦 **Order Received**:\n");

    let id_marker = match style {
        RenderStyle::Verbose => "🔹 ",
        RenderStyle::Debug => "",
    };
    let _ = writeln!(message, "{}**Order ID**: `{}`", id_marker, order.order_id);

    if order.created.is_empty() {
        message.push_str("**Created At**: `Unknown`\n");
    } else {
        let _ = writeln!(message, "**Created At**: `{}`", order.created);
    }

    for (i, product) in order.products_sold.iter().enumerate() {
        if i > 0 {
            message.push_str(SEPARATOR);
        }
        render_product(&mut message, product);
    }

    message.push_str(SEPARATOR);
    message
}

fn render_product(message: &mut String, product: &Product) {
    let _ = writeln!(
        message,
        "🔹 **Product Name**: *{}* (ID: `{}`), \n**Quantity**: `{}`",
        product.product_name, product.product_id, product.quantity
    );

    if !product.user_data.is_empty() {
        message.push_str("🔹 **User Data**:\n");
        for (key, value) in &product.user_data {
            let _ = writeln!(message, "> • **{}**: `{}`", key, value);
        }
    }

    let key_ids = product
        .key_ids_sold
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let _ = writeln!(message, "🔑 **Key IDs Sold**: `[{}]`", key_ids);
}
