use serde::{Deserialize, Serialize};

pub trait Response{}

/// Body posted to a chat webhook.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub content: String
}

#[derive(Debug)]
pub struct NotifyOrderResponse {
    pub order_id: String,
    pub defaulted: bool,
}
impl Response for NotifyOrderResponse{}
