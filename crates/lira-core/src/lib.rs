pub mod domain;
pub mod engine;
pub mod errors;
pub mod ports;
pub mod services;

pub use errors::{CoreError, NotFound};
