use axum::{ extract::{ Path, Query, State }, http::StatusCode, Json };
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entity::withdrawal;
use crate::error::Result;
use crate::services::withdrawal_service::{
    SubmitWithdrawalRequest,
    UpdateStatusRequest,
    WithdrawalPreview,
};

use super::AppState;

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub amount: Decimal,
}

pub async fn submit_withdrawal(
    State(state): State<AppState>,
    Path(artist_id): Path<Uuid>,
    Json(request): Json<SubmitWithdrawalRequest>
) -> Result<(StatusCode, Json<withdrawal::Model>)> {
    let withdrawal = state.withdrawal_service.submit(artist_id, request).await?;

    Ok((StatusCode::CREATED, Json(withdrawal)))
}

pub async fn preview_withdrawal(
    State(state): State<AppState>,
    Path(artist_id): Path<Uuid>,
    Query(query): Query<PreviewQuery>
) -> Result<Json<WithdrawalPreview>> {
    let preview = state.withdrawal_service.preview(artist_id, query.amount).await?;

    Ok(Json(preview))
}

pub async fn list_withdrawals(
    State(state): State<AppState>,
    Path(artist_id): Path<Uuid>
) -> Result<Json<Vec<withdrawal::Model>>> {
    let withdrawals = state.withdrawal_service.list_for_artist(artist_id).await?;

    Ok(Json(withdrawals))
}

pub async fn get_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>
) -> Result<Json<withdrawal::Model>> {
    let withdrawal = state.withdrawal_service.get(withdrawal_id).await?;

    Ok(Json(withdrawal))
}

pub async fn update_withdrawal_status(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>
) -> Result<Json<withdrawal::Model>> {
    let withdrawal = state.withdrawal_service.update_status(withdrawal_id, request).await?;

    Ok(Json(withdrawal))
}
