// Journal access errors
// Surfaced by JournalSource implementations; all of them are fatal to a run.

use std::io;

use thiserror::Error;

use crate::value_objects::Usn;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("cannot open volume {volume}")]
    Access {
        volume: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot query change journal metadata")]
    Query {
        #[source]
        source: io::Error,
    },
    #[error("cannot read change journal page at USN {start_usn}")]
    Read {
        start_usn: Usn,
        #[source]
        source: io::Error,
    },
}

impl JournalError {
    /// Raw operating system error code behind the failure, when there is one.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            JournalError::Access { source, .. }
            | JournalError::Query { source }
            | JournalError::Read { source, .. } => source.raw_os_error(),
        }
    }
}
