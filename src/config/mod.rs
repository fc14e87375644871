//! Configuration modules, each loaded from environment variables.
//!
//! - [`cookies`]: session cookie flags
//! - [`cors`]: allowed origins for cross-origin requests
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`jwt`]: token secret and expiries

pub mod cookies;
pub mod cors;
pub mod database;
pub mod jwt;
