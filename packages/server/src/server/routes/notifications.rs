use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Serialize;

use crate::common::{MarketError, MarketResult, NotificationId, PageParams};
use crate::domains::notifications::Notification;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

pub async fn list_notifications(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(page): Query<PageParams>,
) -> MarketResult<Json<Vec<Notification>>> {
    let notifications =
        Notification::find_for_recipient(user.member_id, page.validate(), &state.db_pool).await?;
    Ok(Json(notifications))
}

pub async fn unread_count(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> MarketResult<Json<UnreadCount>> {
    let unread = Notification::unread_count(user.member_id, &state.db_pool).await?;
    Ok(Json(UnreadCount { unread }))
}

/// Someone else's notification is reported as missing.
pub async fn mark_read(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<NotificationId>,
) -> MarketResult<Json<Notification>> {
    let notification = Notification::mark_read(id, user.member_id, &state.db_pool)
        .await?
        .ok_or(MarketError::NotFound("Notification"))?;
    Ok(Json(notification))
}

pub async fn mark_all_read(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> MarketResult<Json<MarkedRead>> {
    let updated = Notification::mark_all_read(user.member_id, &state.db_pool).await?;
    Ok(Json(MarkedRead { updated }))
}
