use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub products_sold: Vec<Product>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_data: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_ids_sold: Vec<i64>,
}

/// Reads an explicit JSON `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
