pub mod domain;
pub mod nats;
pub mod notification_worker;

pub use notification_worker::*;
