pub mod config;
pub mod logging;

pub mod callback;
pub mod capture;
pub mod credential;
pub mod dispatcher;
pub mod drive;
pub mod error;
pub mod magnet;
pub mod registry;
pub mod resolver;

pub use error::{PandlError, Result};
