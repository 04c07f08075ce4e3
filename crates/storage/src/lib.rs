pub mod backend;
pub mod config;
pub mod error;

pub use backend::{Backend, ObjectSource, ObjectStream, initialize};
pub use config::BackendConfig;
pub use error::{BackendError, Result};
