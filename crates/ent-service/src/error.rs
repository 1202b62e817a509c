use ent_hash::MerkleError;
use ent_policy::Violation;
use ent_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request failed precondition checks. Nothing was stored.
    #[error("invalid request: {}", describe(.0))]
    Validation(Vec<Violation>),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    /// Merkle aggregation was handed input the checks should have rejected.
    #[error("Merkle aggregation failed: {0}")]
    Merkle(#[from] MerkleError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            ServiceError::Validation(violations) => violations,
            _ => &[],
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
