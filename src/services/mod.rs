// Service exports
pub mod artifacts;
pub mod postgres;

pub use artifacts::{ArtifactError, LocalArtifactResolver};
pub use postgres::{PostgresClient, PostgresError};
