use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::db::entity::activity_log;
use crate::db::LedgerStore;
use crate::enums::WithdrawalStatus;
use crate::error::Result;
use crate::ledger;

pub const DEFAULT_ACTIVITY_LIMIT: u64 = 20;
pub const MAX_ACTIVITY_LIMIT: u64 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct ArtistBalances {
    pub artist_id: Uuid,
    pub available_balance: Decimal,
    pub credit_balance: Decimal,
    pub has_pending_request: bool,
}

pub struct ArtistService {
    store: Arc<dyn LedgerStore>,
}

impl ArtistService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn balances(&self, artist_id: Uuid) -> Result<ArtistBalances> {
        let artist = self.store.get_artist(artist_id).await?;
        let outstanding = self.store.list_withdrawals(artist_id, WithdrawalStatus::outstanding()).await?;

        Ok(ArtistBalances {
            artist_id,
            available_balance: artist.available_balance,
            credit_balance: artist.credit_balance,
            has_pending_request: ledger::has_pending_request(&outstanding, artist_id),
        })
    }

    /// Newest first, capped at [`MAX_ACTIVITY_LIMIT`].
    pub async fn activity(&self, artist_id: Uuid, limit: Option<u64>) -> Result<Vec<activity_log::Model>> {
        let limit = limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, MAX_ACTIVITY_LIMIT);
        tracing::debug!("Loading {} activity entries for artist {}", limit, artist_id);
        self.store.get_artist(artist_id).await?;
        self.store.list_activity(artist_id, limit).await
    }
}
