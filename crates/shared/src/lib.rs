//! # tagcheck-shared
//!
//! The [`ErrorEnvelope`] every tagcheck error converts into. Violations are
//! [`ErrorKind::Expected`]; annotation defects are [`ErrorKind::Invariant`].
//! No workspace dependencies.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;

pub use errors::{ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata, InvalidErrorCode};
