pub mod credit_scanner;
pub mod domain;

pub use credit_scanner::*;
