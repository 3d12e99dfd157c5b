use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::credits::{ CreditChange, CreditDirection };
use crate::db::entity::credit_transaction;
use crate::db::LedgerStore;
use crate::error::Result;
use crate::ledger;

#[derive(Debug, Clone, Deserialize)]
pub struct CreditRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub admin_id: Uuid,
}

/// Admin bookkeeping of what artists owe the platform.
pub struct CreditService {
    store: Arc<dyn LedgerStore>,
}

impl CreditService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn add_credit(
        &self,
        artist_id: Uuid,
        request: CreditRequest
    ) -> Result<credit_transaction::Model> {
        self.change(artist_id, CreditDirection::Add, request).await
    }

    pub async fn deduct_credit(
        &self,
        artist_id: Uuid,
        request: CreditRequest
    ) -> Result<credit_transaction::Model> {
        self.change(artist_id, CreditDirection::Remove, request).await
    }

    pub async fn list_transactions(&self, artist_id: Uuid) -> Result<Vec<credit_transaction::Model>> {
        self.store.list_credit_transactions(artist_id).await
    }

    async fn change(
        &self,
        artist_id: Uuid,
        direction: CreditDirection,
        request: CreditRequest
    ) -> Result<credit_transaction::Model> {
        if let Err(e) = ledger::check_amount(request.amount) {
            tracing::warn!("Rejected credit change of {} for artist {}", request.amount, artist_id);
            return Err(e);
        }

        self.store.change_credit(CreditChange {
            artist_id,
            direction,
            amount: request.amount,
            description: request.description,
            actor_id: request.admin_id,
        }).await
    }
}
