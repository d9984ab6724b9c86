//! Command implementations.

mod import;
mod info;
mod validate;

pub use import::run_import;
pub use info::run_info;
pub use validate::run_validate;
