pub mod error;
pub mod request;
pub mod response;

pub use error::{FinsenseError, Result};
