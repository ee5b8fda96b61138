pub mod audit_commands;

pub use audit_commands::*;
