use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid collection path: {0}")]
    InvalidCollectionPath(String),

    #[error("Invalid notification type: {0}")]
    InvalidNotificationType(String),

    #[error("Invalid notification priority: {0}")]
    InvalidNotificationPriority(String),

    #[error("Invalid notification status: {0}")]
    InvalidNotificationStatus(String),

    #[error("Push send error: {0}")]
    PushSendError(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}
