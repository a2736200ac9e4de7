pub mod process;
pub mod scan_service;

pub use process::*;
pub use scan_service::*;
