//! Errors reported by the collaborators of the spawnable container.
//!
//! Recoverable failures of the container itself are described by
//! [`ContainerError`](crate::spawnable::ContainerError).

pub use failure::Error;

pub type Result<T> = ::std::result::Result<T, failure::Error>;
