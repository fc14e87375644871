//! Identity and session lifecycle: register, login, refresh, logout.
//!
//! Two token tiers back every session. The access token is a signed,
//! stateless JWT that proves identity without a store lookup; it cannot be
//! revoked individually, so re-issuance is gated by the refresh token, an
//! opaque persisted value that is rotated on every exchange and revocable
//! at any time.

pub mod controller;
pub mod model;
pub mod refresh;
pub mod router;
pub mod service;
