//! Business logic services.

pub mod entitlement;
pub mod processing;
pub mod users;

pub use processing::VideoLockMap;
pub use users::UserService;
