//! Error taxonomy shared by the services and the HTTP layer.
//!
//! Services return [`CoreError`]; the server maps each [`CoreErrorKind`] to a
//! status code and decides how much of the message reaches the client.

pub mod core_error;

pub use core_error::{CoreError, CoreErrorKind};

pub type CoreResult<T> = Result<T, CoreError>;
