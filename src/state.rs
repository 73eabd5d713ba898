use std::sync::Arc;

use crate::cqrs::NotifyOrderCommandHandler;

#[derive(Clone)]
pub struct AppState {
    pub notify_order_command_handler: Arc<NotifyOrderCommandHandler>,
    /// Upper bound on a buffered request body.
    pub max_body_bytes: usize,
}
