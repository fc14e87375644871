pub mod auth;
pub mod orgs;
pub mod profiles;
pub mod specialties;
pub mod users;
