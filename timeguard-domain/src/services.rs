// Domain services
pub mod collector;
pub mod detector;
pub mod record;

pub use collector::*;
pub use detector::*;
pub use record::*;
