//! Error types shared by the storage gateways, the services and the REST layer.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failure reported by a storage gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("store error: {0}")]
    Other(String),
}

/// Failure of a service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller supplied an unusable amount.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Not enough balance to perform withdraw")]
    InsufficientBalance,

    /// The balance step of an order insert failed; the cause is kept as `source()`.
    #[error("Unable to insert new order")]
    UnableToInsertOrder(#[source] Box<ServiceError>),

    #[error("Unable to update the order")]
    UnableToUpdateOrder(#[source] Box<ServiceError>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub(crate) fn user_not_found() -> Self {
        ServiceError::NotFound("User not found".to_string())
    }

    pub(crate) fn order_not_found() -> Self {
        ServiceError::NotFound("Order not found".to_string())
    }

    /// True for the errors a balance operation raises on its own account.
    pub fn is_balance_error(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidArgument(_)
                | ServiceError::NotFound(_)
                | ServiceError::InsufficientBalance
        )
    }

    pub(crate) fn unable_to_insert(self) -> Self {
        if self.is_balance_error() {
            ServiceError::UnableToInsertOrder(Box::new(self))
        } else {
            self
        }
    }

    pub(crate) fn unable_to_update(self) -> Self {
        if self.is_balance_error() {
            ServiceError::UnableToUpdateOrder(Box::new(self))
        } else {
            self
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to a client.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if let ServiceError::Store(e) = &self {
            tracing::error!(error = %e, "store failure while handling request");
        }

        let status = self.status();
        (status, Json(json!({ "message": self.public_message() }))).into_response()
    }
}
