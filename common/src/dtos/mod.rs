mod process;
pub use process::*;

mod root;
pub use root::*;
