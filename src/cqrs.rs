use std::sync::Arc;

use axum::body::Bytes;
use tracing::{event, Level};

use crate::{
    domain::Order,
    dtos::{NotifyOrderResponse, Response},
    errors::PipelineError,
    normalize::{default_order, normalize},
    notifier::Notifier,
};

// traits
pub trait Command{}

pub trait CommandHandler<C: Command, R: Response>{
    async fn handle(&self, input: &C) -> Result<R, PipelineError>;
}

/// One inbound notification. `body` is `None` when the request body could not
/// be read.
pub struct NotifyOrderCommand {
    pub body: Option<Bytes>,
}
impl Command for NotifyOrderCommand{}

pub struct NotifyOrderCommandHandler {
    notifier: Arc<dyn Notifier + Send + Sync>,
}

impl NotifyOrderCommandHandler {
    pub fn new(notifier: Arc<dyn Notifier + Send + Sync>) -> Self {
        NotifyOrderCommandHandler {
            notifier: notifier
        }
    }

    async fn dispatch(&self, order: Order, defaulted: bool) -> Result<NotifyOrderResponse, PipelineError> {
        match self.notifier.notify(&order).await {
            Ok(()) => Ok(NotifyOrderResponse {
                order_id: order.order_id,
                defaulted: defaulted,
            }),
            Err(e) => {
                event!(Level::WARN, "Error occurred while delivering order {}: {}", order.order_id, e);
                Err(PipelineError::Delivery {
                    defaulted: defaulted,
                    source: e,
                })
            }
        }
    }
}

impl CommandHandler<NotifyOrderCommand, NotifyOrderResponse> for NotifyOrderCommandHandler {
    async fn handle(&self, input: &NotifyOrderCommand) -> Result<NotifyOrderResponse, PipelineError> {
        let body = match &input.body {
            Some(body) if !body.is_empty() => body,
            _ => {
                event!(Level::INFO, "empty request, sending default order");
                return self.dispatch(default_order(), true).await;
            }
        };

        let order: Order = match serde_json::from_slice(body) {
            Ok(order) => order,
            Err(e) => {
                event!(Level::WARN, "rejecting malformed order body: {}", e);
                return Err(PipelineError::MalformedInput(e));
            }
        };

        self.dispatch(normalize(order), false).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::notifier::{DeliveryError, DispatchError};

    /// Notifier that keeps every order it is handed and fails on demand.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub(crate) fail: bool,
        pub(crate) orders: Mutex<Vec<Order>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, order: &Order) -> Result<(), DispatchError> {
            self.orders.lock().await.push(order.clone());
            if self.fail {
                Err(DispatchError {
                    failures: vec![(String::from("primary"), DeliveryError::MissingEndpoint)],
                })
            } else {
                Ok(())
            }
        }
    }

    fn handler(fail: bool) -> (Arc<RecordingNotifier>, NotifyOrderCommandHandler) {
        let notifier = Arc::new(RecordingNotifier {
            fail: fail,
            ..Default::default()
        });
        (notifier.clone(), NotifyOrderCommandHandler::new(notifier))
    }

    fn command(body: &str) -> NotifyOrderCommand {
        NotifyOrderCommand {
            body: Some(Bytes::from(body.to_string())),
        }
    }

    #[tokio::test]
    async fn valid_body_is_normalized_then_notified() {
        let (notifier, handler) = handler(false);

        let response = handler
            .handle(&command(r#"{"order_id":"A1","created":"2024-01-01T00:00:00Z","products_sold":[{"product_id":5,"quantity":0}]}"#))
            .await
            .unwrap();

        assert_eq!(response.order_id, "A1");
        assert!(!response.defaulted);

        let orders = notifier.orders.lock().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].created, "2024-01-01T07:00:00+07:00");
        assert_eq!(orders[0].products_sold[0].product_name, "New Product");
        assert_eq!(orders[0].products_sold[0].quantity, 1);
    }

    #[tokio::test]
    async fn empty_or_unreadable_body_sends_default_order() {
        for body in [None, Some(Bytes::new())] {
            let (notifier, handler) = handler(false);

            let response = handler.handle(&NotifyOrderCommand { body: body }).await.unwrap();

            assert!(response.defaulted);
            assert_eq!(response.order_id, "Unknown Order ID");
            let orders = notifier.orders.lock().await;
            assert_eq!(orders.len(), 1);
            assert_eq!(orders[0].products_sold.len(), 1);
        }
    }

    #[tokio::test]
    async fn malformed_body_never_reaches_notifier() {
        let (notifier, handler) = handler(false);

        let err = handler.handle(&command("not json")).await.unwrap_err();

        assert!(matches!(err, PipelineError::MalformedInput(_)));
        assert!(notifier.orders.lock().await.is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_reported_with_origin() {
        let (_, handler) = handler(true);

        let err = handler.handle(&command(r#"{"order_id":"A1"}"#)).await.unwrap_err();
        assert!(matches!(err, PipelineError::Delivery { defaulted: false, .. }));

        let err = handler.handle(&NotifyOrderCommand { body: None }).await.unwrap_err();
        assert!(matches!(err, PipelineError::Delivery { defaulted: true, .. }));
    }
}
