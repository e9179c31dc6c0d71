//! Base types and error handling.
//!
//! Provides the foundational pieces shared by every pipeline stage:
//! - [`error::HopError`]: stable-coded execution errors with structured context
//! - [`policy::ExecutionPolicy`]: redirect, security, and body-handling configuration

pub mod error;
pub mod policy;
