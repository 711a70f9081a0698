//! Command implementations for bank-cli

pub mod apply;
pub mod inspect;

pub use apply::run_apply;
pub use inspect::{run_banks, run_groups, run_show, run_status};
