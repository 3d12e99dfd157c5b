pub mod entity;
pub use entity::*;

pub mod store;
pub use store::{ LedgerStore, NewActivity, NewCreditTransaction, NewNotification };

mod ledger_repository;
pub use ledger_repository::LedgerRepository;

#[cfg(test)]
pub mod memory;
