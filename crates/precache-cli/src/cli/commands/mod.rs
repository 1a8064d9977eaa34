//! CLI command handlers, one file per command.

mod checksum;
mod core_release;
mod items;
mod list;

pub use checksum::run_checksum;
pub use core_release::run_core;
pub use items::run_items;
pub use list::run_list;
