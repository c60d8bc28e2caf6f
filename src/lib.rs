pub mod config;
pub mod display;
pub mod error;
pub mod logger;
pub mod parser;
pub mod schedule;

pub use error::{Error, Result};
