//! Error type for repository methods that mix database and domain
//! failures (reorders, type-guarded payload updates).

use etude_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
