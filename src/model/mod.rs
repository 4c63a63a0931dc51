pub mod association;
pub mod config;
pub mod tag;

pub use association::*;
pub use config::*;
pub use tag::*;
