pub mod env;
pub mod mime;
pub mod random;
pub mod serialize;
