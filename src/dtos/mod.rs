pub mod auth;
pub mod response;
pub mod user;
