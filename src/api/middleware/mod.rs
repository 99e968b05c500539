pub mod error;
pub mod tenant;

pub use error::*;
pub use tenant::*;
