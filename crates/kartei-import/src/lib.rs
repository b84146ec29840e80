pub mod confirm;
pub mod error;
pub mod money;
pub mod preview;
pub mod row;
pub mod sheet;

pub use error::{ImportError, Result};
