pub mod user_service;
pub mod order_service;

use crate::{error::ServiceError, repositories::UnitOfWork};

/// Ends a unit of work: commits when `result` is `Ok`, rolls back otherwise.
pub(crate) async fn finish<T>(
    uow: Box<dyn UnitOfWork>,
    result: Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}
