use thiserror::Error;

/// Authorization failures for forum operations
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Admin access required")]
    AdminRequired,

    #[error("Active moderator grant required for this content")]
    ModeratorRequired,

    #[error("Only the author may modify this content")]
    NotOwner,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
