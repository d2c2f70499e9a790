pub mod cache;
pub mod role_guard;
