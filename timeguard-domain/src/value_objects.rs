// Domain value objects
pub mod file_time;
pub mod usn;

pub use file_time::*;
pub use usn::*;
