mod conversion;
pub use conversion::*;

mod errors;
pub use errors::*;

mod health;
pub use health::*;
