//! Account records. No routes of their own; the auth module drives all
//! account creation and lookup.

pub mod model;
pub mod service;
