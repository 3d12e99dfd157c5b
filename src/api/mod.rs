use std::sync::Arc;

pub mod artist;
pub mod credit;
pub mod withdrawal;

use crate::services::{ ArtistService, CreditService, WithdrawalService };

#[derive(Clone)]
pub struct AppState {
    pub withdrawal_service: Arc<WithdrawalService>,
    pub credit_service: Arc<CreditService>,
    pub artist_service: Arc<ArtistService>,
}

impl AppState {
    pub fn new(
        withdrawal_service: Arc<WithdrawalService>,
        credit_service: Arc<CreditService>,
        artist_service: Arc<ArtistService>
    ) -> Self {
        Self {
            withdrawal_service,
            credit_service,
            artist_service,
        }
    }
}
