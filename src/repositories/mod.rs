pub mod refresh_tokens;
pub mod users;

#[cfg(test)]
pub mod memory;
