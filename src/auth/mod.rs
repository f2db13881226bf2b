// src/auth/mod.rs

pub mod callback;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state_store;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use extractors::AuthedUser;
pub use routes::auth_routes;
