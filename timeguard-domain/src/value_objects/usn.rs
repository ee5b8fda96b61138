// Update sequence number value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a change record in the journal. Assigned monotonically by the
/// filesystem and used as the causal ordering key.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Usn(pub u64);

impl fmt::Display for Usn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
