//! Shared utilities.
//!
//! - [`errors`]: application error type and response mapping
//! - [`jwt`]: access token creation and verification
//! - [`password`]: bcrypt hashing and verification
//! - [`public_id`]: short public identifier allocation

pub mod errors;
pub mod jwt;
pub mod password;
pub mod public_id;
