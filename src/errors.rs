use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::notifier::DispatchError;

/// Every way one ingestion can fail. Both map straight to a status code with a
/// plain-text body.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid JSON")]
    MalformedInput(#[source] serde_json::Error),
    #[error("{}", delivery_message(*defaulted))]
    Delivery {
        /// True when the message was the built-in default order.
        defaulted: bool,
        #[source]
        source: DispatchError,
    },
}

fn delivery_message(defaulted: bool) -> &'static str {
    if defaulted {
        "Failed to send default order to Discord"
    } else {
        "Failed to send to Discord"
    }
}

impl PipelineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedInput(_) => StatusCode::BAD_REQUEST,
            Self::Delivery { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::DeliveryError;

    fn dispatch_error() -> DispatchError {
        DispatchError {
            failures: vec![(String::from("primary"), DeliveryError::MissingEndpoint)],
        }
    }

    #[test]
    fn malformed_input_is_bad_request() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = PipelineError::MalformedInput(source);

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid JSON");
    }

    #[test]
    fn delivery_failure_is_server_error() {
        let err = PipelineError::Delivery {
            defaulted: false,
            source: dispatch_error(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to send to Discord");

        let err = PipelineError::Delivery {
            defaulted: true,
            source: dispatch_error(),
        };
        assert_eq!(err.to_string(), "Failed to send default order to Discord");
    }
}
