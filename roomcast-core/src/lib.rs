pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod token;

pub use client::MediaClient;
pub use config::Config;
pub use error::{Error, Result};
