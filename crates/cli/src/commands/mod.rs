//! Command implementations.

mod run;
mod send;
mod validate;

pub use run::run_repeater;
pub use send::run_send;
pub use validate::run_validate;
