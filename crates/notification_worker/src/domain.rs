mod collecte_service;
mod push_relay_service;

pub use collecte_service::*;
pub use push_relay_service::*;
