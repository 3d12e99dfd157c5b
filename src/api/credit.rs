use axum::{ extract::{ Path, State }, http::StatusCode, Json };
use uuid::Uuid;

use crate::db::entity::credit_transaction;
use crate::error::Result;
use crate::services::credit_service::CreditRequest;

use super::AppState;

pub async fn add_credit(
    State(state): State<AppState>,
    Path(artist_id): Path<Uuid>,
    Json(request): Json<CreditRequest>
) -> Result<(StatusCode, Json<credit_transaction::Model>)> {
    let entry = state.credit_service.add_credit(artist_id, request).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn deduct_credit(
    State(state): State<AppState>,
    Path(artist_id): Path<Uuid>,
    Json(request): Json<CreditRequest>
) -> Result<(StatusCode, Json<credit_transaction::Model>)> {
    let entry = state.credit_service.deduct_credit(artist_id, request).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_credit_transactions(
    State(state): State<AppState>,
    Path(artist_id): Path<Uuid>
) -> Result<Json<Vec<credit_transaction::Model>>> {
    let entries = state.credit_service.list_transactions(artist_id).await?;

    Ok(Json(entries))
}
