//! Request middleware and extractors.
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <token>` (or the `TOKEN` cookie)
//! 2. [`auth::AuthUser`] verifies the JWT signature and expiry
//! 3. Tokens lacking the `public_id` claim are rejected, forcing re-login
//! 4. The handler receives the resolved identity

pub mod auth;
