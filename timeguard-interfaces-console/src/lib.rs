pub mod progress;
pub mod report;

pub use progress::ConsoleProgress;
pub use report::{render_anomaly, render_detection};
