pub mod error;
pub mod geometry;
pub mod io;
pub mod math;
pub mod operations;
pub mod units;

pub use error::{PatchworkError, Result};
