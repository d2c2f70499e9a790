// src/main.rs
mod core;
mod dtos;
mod entity;
mod extractors;
mod handlers;
mod middleware;
mod repositories;
mod routes;
mod services;
mod start;
mod state;
mod utils;

#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() {
    start::run().await;
}
