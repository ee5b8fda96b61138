use thiserror::Error;

use timeguard_domain::JournalError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("journal metadata query failed")]
    Query(#[source] JournalError),
    #[error("journal collection aborted")]
    Collection(#[source] JournalError),
}

impl AppError {
    pub fn journal_error(&self) -> &JournalError {
        match self {
            AppError::Query(err) | AppError::Collection(err) => err,
        }
    }
}
