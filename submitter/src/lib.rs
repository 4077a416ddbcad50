pub mod client;
pub mod dtos;
pub mod error;
pub mod models;
pub mod persistence;
pub mod routes;
pub mod settings;
pub mod state;
pub mod submit;

#[cfg(test)]
pub(crate) mod testing;
