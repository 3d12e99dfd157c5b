pub mod notifier;
pub mod email_function;

pub use notifier::{ DeliveryResponse, Notifier, WithdrawalEmail };
pub use email_function::EmailFunctionNotifier;
