pub mod config;
pub mod error;
pub mod generation;
pub mod history;
pub mod pipeline;
pub mod server;

pub use error::{Error, Result};
