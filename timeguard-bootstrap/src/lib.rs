pub mod context;
pub mod lifecycle;

pub use lifecycle::{run, run_with};
