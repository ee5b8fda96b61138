// Domain entities
pub mod anomaly;
pub mod collection;
pub mod journal_entry;
pub mod journal_metadata;
pub mod settings;

pub use anomaly::*;
pub use collection::*;
pub use journal_entry::*;
pub use journal_metadata::*;
pub use settings::*;
