pub mod consts;
pub mod dtos;
pub mod models;
pub mod persistence;
pub mod util;
