// Port traits (interfaces)
// Define what the domain needs from the volume and the console

pub mod journal;
pub mod observer;

pub use journal::*;
pub use observer::*;
