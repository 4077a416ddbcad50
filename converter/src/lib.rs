pub mod convert;
pub mod encode;
pub mod error;
pub mod rasterize;
pub mod routes;
pub mod settings;
pub mod state;
pub mod watermark;
