pub mod withdrawal_service;
pub mod credit_service;
pub mod artist_service;

pub use withdrawal_service::WithdrawalService;
pub use credit_service::CreditService;
pub use artist_service::ArtistService;
