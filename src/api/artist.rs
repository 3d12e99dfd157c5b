use axum::{ extract::{ Path, Query, State }, Json };
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entity::activity_log;
use crate::error::Result;
use crate::services::artist_service::ArtistBalances;

use super::AppState;

#[derive(Deserialize)]
pub struct ActivityQuery {
    #[serde(default)]
    pub limit: Option<u64>,
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(artist_id): Path<Uuid>
) -> Result<Json<ArtistBalances>> {
    let balances = state.artist_service.balances(artist_id).await?;

    Ok(Json(balances))
}

pub async fn get_activity(
    State(state): State<AppState>,
    Path(artist_id): Path<Uuid>,
    Query(query): Query<ActivityQuery>
) -> Result<Json<Vec<activity_log::Model>>> {
    let activity = state.artist_service.activity(artist_id, query.limit).await?;

    Ok(Json(activity))
}
