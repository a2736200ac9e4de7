mod collecte;
mod credit;
mod device_token;
mod fields;
mod notification;
mod push;
mod result;

pub use collecte::*;
pub use credit::*;
pub use device_token::*;
pub use fields::*;
pub use notification::*;
pub use push::*;
pub use result::*;
