//! List query builder: pagination and filter params, values rendered from JSON.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
