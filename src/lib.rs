pub mod config;
pub mod error;
pub mod ml;
pub mod predictions;
pub mod recommendations;
pub mod server;

pub use error::{Error, Result};
