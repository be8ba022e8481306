//! Orders and the balance movements tied to them.
//!
//! Creating an order charges its price to the owner, updating it refunds the
//! old charge before applying the new one, and deleting it refunds the charge.
//! Each of those runs in a single unit of work so a failure half way leaves no
//! balance change behind.

use crate::{
    AppState,
    error::ServiceError,
    models::{Item, Order},
    repositories::UnitOfWork,
};

use super::{
    finish,
    user_service::{deposit_in, withdraw_in},
};

pub async fn get_all_orders(state: &AppState) -> Result<Vec<Order>, ServiceError> {
    let mut uow = state.store.begin().await?;
    let result = uow.orders().find_all().await.map_err(ServiceError::from);
    finish(uow, result).await
}

/// `None` when there is no such order; a miss is not an error.
pub async fn get_order_by_id(state: &AppState, id: i64) -> Result<Option<Order>, ServiceError> {
    let mut uow = state.store.begin().await?;
    let result = uow.orders().find_by_id(id).await.map_err(ServiceError::from);
    finish(uow, result).await
}

pub async fn get_orders_by_item(state: &AppState, item: Item) -> Result<Vec<Order>, ServiceError> {
    let mut uow = state.store.begin().await?;
    let result = uow.orders().find_by_item(item).await.map_err(ServiceError::from);
    finish(uow, result).await
}

pub async fn get_orders_by_price(state: &AppState, price: i64) -> Result<Vec<Order>, ServiceError> {
    let mut uow = state.store.begin().await?;
    let result = uow.orders().find_by_price(price).await.map_err(ServiceError::from);
    finish(uow, result).await
}

pub async fn insert_new_order(state: &AppState, mut order: Order) -> Result<Order, ServiceError> {
    order.id = None;

    let mut uow = state.store.begin().await?;
    let result = insert_in(uow.as_mut(), order).await;
    finish(uow, result).await
}

pub async fn update_order_by_id(
    state: &AppState,
    id: i64,
    mut replacement: Order,
) -> Result<Order, ServiceError> {
    replacement.id = Some(id);

    let mut uow = state.store.begin().await?;
    let result = update_in(uow.as_mut(), id, replacement).await;
    finish(uow, result).await
}

/// Deletes the order and credits its price back to the owner, if it has one.
pub async fn delete_order_by_id(state: &AppState, id: i64) -> Result<(), ServiceError> {
    let mut uow = state.store.begin().await?;
    let result = delete_in(uow.as_mut(), id).await;
    finish(uow, result).await
}

fn owner_of(order: &Order) -> Result<i64, ServiceError> {
    order.user_id.ok_or_else(ServiceError::user_not_found)
}

async fn charge(uow: &mut dyn UnitOfWork, order: &Order) -> Result<(), ServiceError> {
    withdraw_in(uow, owner_of(order)?, order.price).await
}

async fn refund(uow: &mut dyn UnitOfWork, order: &Order) -> Result<(), ServiceError> {
    deposit_in(uow, owner_of(order)?, order.price).await
}

async fn insert_in(uow: &mut dyn UnitOfWork, order: Order) -> Result<Order, ServiceError> {
    if let Err(cause) = charge(uow, &order).await {
        tracing::warn!(user_id = ?order.user_id, price = order.price, error = %cause, "order insert rejected");
        return Err(cause.unable_to_insert());
    }

    Ok(uow.orders().save(order).await?)
}

async fn update_in(
    uow: &mut dyn UnitOfWork,
    id: i64,
    replacement: Order,
) -> Result<Order, ServiceError> {
    let existing = uow.orders().find_by_id(id).await?;

    if let Err(cause) = move_charge(uow, existing.as_ref(), &replacement).await {
        tracing::warn!(order_id = id, error = %cause, "order update rejected");
        return Err(cause.unable_to_update());
    }

    Ok(uow.orders().save(replacement).await?)
}

// refund first so the same user can be re-charged against the restored balance
async fn move_charge(
    uow: &mut dyn UnitOfWork,
    existing: Option<&Order>,
    replacement: &Order,
) -> Result<(), ServiceError> {
    let existing = existing.ok_or_else(ServiceError::order_not_found)?;

    refund(uow, existing).await?;
    charge(uow, replacement).await
}

async fn delete_in(uow: &mut dyn UnitOfWork, id: i64) -> Result<(), ServiceError> {
    let Some(existing) = uow.orders().find_by_id(id).await? else {
        return Err(ServiceError::order_not_found());
    };

    if existing.user_id.is_some() {
        refund(uow, &existing).await?;
    }
    uow.orders().delete_by_id(id).await?;

    tracing::info!(order_id = id, "order deleted");
    Ok(())
}
