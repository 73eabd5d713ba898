use std::collections::BTreeMap;

use tracing::{event, Level};

use crate::{
    clock::{convert_to_target_zone, now_in_target_zone},
    domain::{Order, Product},
};

pub const UNKNOWN_ORDER_ID: &str = "Unknown Order ID";
pub const PLACEHOLDER_PRODUCT_NAME: &str = "New Product";
pub const DEFAULT_QUANTITY: u32 = 1;

/// Fills in every empty field of a freshly parsed order. Never fails: a
/// `created` value that is not RFC 3339 is kept as-is.
pub fn normalize(mut order: Order) -> Order {
    if order.order_id.is_empty() {
        order.order_id = String::from(UNKNOWN_ORDER_ID);
    }

    if order.created.is_empty() {
        order.created = now_in_target_zone();
    } else {
        match convert_to_target_zone(&order.created) {
            Ok(converted) => order.created = converted,
            Err(e) => event!(Level::DEBUG, "keeping created timestamp as received: {}", e),
        }
    }

    for product in order.products_sold.iter_mut() {
        if product.product_name.is_empty() {
            product.product_name = String::from(PLACEHOLDER_PRODUCT_NAME);
        }

        if product.quantity == 0 {
            product.quantity = DEFAULT_QUANTITY;
        }
    }

    order
}

/// Order sent when a request arrives with an empty or unreadable body.
pub fn default_order() -> Order {
    Order {
        order_id: String::from(UNKNOWN_ORDER_ID),
        created: now_in_target_zone(),
        products_sold: vec![Product {
            product_id: 0,
            product_name: String::from(PLACEHOLDER_PRODUCT_NAME),
            quantity: DEFAULT_QUANTITY,
            user_data: BTreeMap::new(),
            key_ids_sold: Vec::new(),
        }],
    }
}
