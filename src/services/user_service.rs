use crate::{
    AppState,
    error::ServiceError,
    models::User,
    repositories::UnitOfWork,
};

use super::finish;

pub async fn get_all_users(state: &AppState) -> Result<Vec<User>, ServiceError> {
    let mut uow = state.store.begin().await?;
    let result = uow.users().find_all().await.map_err(ServiceError::from);
    finish(uow, result).await
}

/// `None` when there is no such user; a miss is not an error.
pub async fn get_user_by_id(state: &AppState, id: i64) -> Result<Option<User>, ServiceError> {
    let mut uow = state.store.begin().await?;
    let result = uow.users().find_by_id(id).await.map_err(ServiceError::from);
    finish(uow, result).await
}

pub async fn find_user_by_username(
    state: &AppState,
    username: &str,
) -> Result<Option<User>, ServiceError> {
    let mut uow = state.store.begin().await?;
    let result = uow
        .users()
        .find_by_username(username)
        .await
        .map_err(ServiceError::from);
    finish(uow, result).await
}

pub async fn get_users_with_low_balance(
    state: &AppState,
    threshold: i64,
) -> Result<Vec<User>, ServiceError> {
    let mut uow = state.store.begin().await?;
    let result = uow
        .users()
        .find_all_with_low_balance(threshold)
        .await
        .map_err(ServiceError::from);
    finish(uow, result).await
}

/// Any id sent by the client is ignored; the store assigns a new one.
pub async fn insert_new_user(state: &AppState, mut user: User) -> Result<User, ServiceError> {
    user.id = None;

    let mut uow = state.store.begin().await?;
    let result = uow.users().save(user).await.map_err(ServiceError::from);
    finish(uow, result).await
}

pub async fn update_user_by_id(
    state: &AppState,
    id: i64,
    mut replacement: User,
) -> Result<User, ServiceError> {
    replacement.id = Some(id);

    let mut uow = state.store.begin().await?;
    let result = uow.users().save(replacement).await.map_err(ServiceError::from);
    finish(uow, result).await
}

/// Removes the user together with every order it owns.
pub async fn delete_user_by_id(state: &AppState, id: i64) -> Result<(), ServiceError> {
    let mut uow = state.store.begin().await?;
    let result = delete_user_in(uow.as_mut(), id).await;
    finish(uow, result).await
}

async fn delete_user_in(uow: &mut dyn UnitOfWork, id: i64) -> Result<(), ServiceError> {
    if uow.users().find_by_id(id).await?.is_none() {
        return Err(ServiceError::user_not_found());
    }

    let removed_orders = uow.orders().delete_by_user(id).await?;
    uow.users().delete_by_id(id).await?;

    tracing::info!(user_id = id, removed_orders, "user deleted");
    Ok(())
}

pub async fn deposit(state: &AppState, id: i64, amount: i64) -> Result<(), ServiceError> {
    let mut uow = state.store.begin().await?;
    let result = deposit_in(uow.as_mut(), id, amount).await;
    finish(uow, result).await
}

pub async fn withdraw(state: &AppState, id: i64, amount: i64) -> Result<(), ServiceError> {
    let mut uow = state.store.begin().await?;
    let result = withdraw_in(uow.as_mut(), id, amount).await;
    finish(uow, result).await
}

/// Credits `amount` to the user inside an already open unit of work.
pub(crate) async fn deposit_in(
    uow: &mut dyn UnitOfWork,
    id: i64,
    amount: i64,
) -> Result<(), ServiceError> {
    if amount < 0 {
        return Err(ServiceError::InvalidArgument(
            "Deposit amount cannot be negative".to_string(),
        ));
    }

    let Some(mut user) = uow.users().find_by_id(id).await? else {
        return Err(ServiceError::user_not_found());
    };

    user.balance = user.balance.checked_add(amount).ok_or_else(|| {
        ServiceError::InvalidArgument("Deposit amount is too large".to_string())
    })?;
    let balance = user.balance;
    uow.users().save(user).await?;

    tracing::info!(user_id = id, amount, balance, "deposit");
    Ok(())
}

/// Debits `amount` from the user inside an already open unit of work.
///
/// Withdrawing exactly the current balance is allowed and leaves it at zero.
pub(crate) async fn withdraw_in(
    uow: &mut dyn UnitOfWork,
    id: i64,
    amount: i64,
) -> Result<(), ServiceError> {
    if amount < 0 {
        return Err(ServiceError::InvalidArgument(
            "Withdraw amount cannot be negative".to_string(),
        ));
    }

    let Some(mut user) = uow.users().find_by_id(id).await? else {
        return Err(ServiceError::user_not_found());
    };

    let remaining = match user.balance.checked_sub(amount) {
        Some(rest) if rest >= 0 => rest,
        _ => return Err(ServiceError::InsufficientBalance),
    };

    user.balance = remaining;
    uow.users().save(user).await?;

    tracing::info!(user_id = id, amount, balance = remaining, "withdraw");
    Ok(())
}
