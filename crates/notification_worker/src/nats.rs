mod collecte_processor;
mod notification_producer;
mod push_producer;
mod push_relay_processor;

pub use collecte_processor::*;
pub use notification_producer::*;
pub use push_producer::*;
pub use push_relay_processor::*;
