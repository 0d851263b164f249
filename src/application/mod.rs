//! Application layer services implementing business logic.
//!
//! Services consume repository traits from the domain layer and provide the
//! API the HTTP handlers and CLI call into.

pub mod services;
