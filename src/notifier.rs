use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::{event, Level};

use crate::{
    config::AppConfig,
    domain::Order,
    dtos::WebhookPayload,
    render::{render, RenderStyle},
};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("no webhook URL is configured for this target")]
    MissingEndpoint,
    #[error("could not reach webhook: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook rejected the message with status {status}")]
    RemoteRejected { status: StatusCode },
}

/// Every target that failed during one fan-out. Never empty.
#[derive(Debug, Error)]
#[error("delivery failed for {} target(s){}", failures.len(), describe_failures(failures))]
pub struct DispatchError {
    pub failures: Vec<(String, DeliveryError)>,
}

fn describe_failures(failures: &[(String, DeliveryError)]) -> String {
    failures.iter().map(|(label, e)| format!("; {}: {}", label, e)).collect()
}

#[async_trait]
pub trait Notifier {
    async fn notify(&self, order: &Order) -> Result<(), DispatchError>;
}

#[derive(Debug, Clone)]
pub struct WebhookTarget {
    pub label: String,
    pub endpoint: Option<Url>,
    pub style: RenderStyle,
}

impl WebhookTarget {
    pub fn new(label: &str, endpoint: Option<Url>, style: RenderStyle) -> Self {
        WebhookTarget {
            label: String::from(label),
            endpoint: endpoint,
            style: style,
        }
    }
}

#[derive(Clone)]
pub struct WebhookDispatcher {
    client: Client,
    targets: Vec<WebhookTarget>,
}

impl WebhookDispatcher {
    pub fn new(targets: Vec<WebhookTarget>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(WebhookDispatcher {
            client: client,
            targets: targets,
        })
    }

    /// The primary target is always present, even without a URL, so a missing
    /// `DISCORD_WEBHOOK_URL` fails each request instead of being skipped.
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let mut targets = vec![WebhookTarget::new(
            "primary",
            config.primary_webhook_url.clone(),
            RenderStyle::Verbose,
        )];

        if let Some(debug_url) = &config.debug_webhook_url {
            targets.push(WebhookTarget::new("debug", Some(debug_url.clone()), RenderStyle::Debug));
        }

        Self::new(targets, config.webhook_timeout)
    }

    pub fn targets(&self) -> &[WebhookTarget] {
        &self.targets
    }

    /// Single POST of `{"content": message}`. No retries.
    pub async fn deliver(&self, endpoint: &Url, message: &str) -> Result<(), DeliveryError> {
        let payload = WebhookPayload {
            content: String::from(message),
        };

        let response = self.client.post(endpoint.clone()).json(&payload).send().await?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            status => Err(DeliveryError::RemoteRejected { status: status }),
        }
    }

    async fn deliver_to(&self, target: &WebhookTarget, order: &Order) -> Result<(), DeliveryError> {
        let endpoint = target.endpoint.as_ref().ok_or(DeliveryError::MissingEndpoint)?;
        let message = render(order, target.style);

        self.deliver(endpoint, &message).await
    }
}

#[async_trait]
impl Notifier for WebhookDispatcher {
    async fn notify(&self, order: &Order) -> Result<(), DispatchError> {
        let results = join_all(self.targets.iter().map(|target| async move {
            (target, self.deliver_to(target, order).await)
        }))
        .await;

        let mut failures = Vec::new();
        for (target, result) in results {
            match result {
                Ok(()) => {
                    event!(Level::INFO, "order {} delivered to {} webhook", order.order_id, target.label);
                }
                Err(e) => {
                    event!(Level::WARN, "order {} not delivered to {} webhook: {}", order.order_id, target.label, e);
                    failures.push((target.label.clone(), e));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError { failures: failures })
        }
    }
}
