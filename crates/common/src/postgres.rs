mod client;
mod credit_sale_repository;
mod device_token_repository;
mod notification_repository;

pub use client::*;
pub use credit_sale_repository::*;
pub use device_token_repository::*;
pub use notification_repository::*;
