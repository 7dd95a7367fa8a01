// Application layer - orchestrates storage and the pure domain builders.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
