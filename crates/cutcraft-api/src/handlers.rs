//! Request handlers.

pub mod account;
pub mod health;
pub mod videos;

pub use account::*;
pub use health::*;
pub use videos::*;
