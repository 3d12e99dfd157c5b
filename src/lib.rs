pub mod config;
pub mod enums;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod credits;
pub mod db;
pub mod providers;
pub mod dispatcher;
pub mod services;
pub mod api;

pub use config::Config;
pub use enums::{ WithdrawalStatus, CreditTransactionType, ActivityType, NotificationEvent, DeliveryStatus };
pub use error::{ AppError, Result };
