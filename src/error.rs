// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types shared by the reconciliation engine.

/// Errors surfaced by uid parsing, field lookup, merging and the store.
///
/// Missing field values are never errors: they are simply left out of
/// whatever aggregation is being computed.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Invalid uid: {0}")]
    InvalidUid(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field {field} does not support aggregation policy {policy}")]
    MergeConfig {
        field: &'static str,
        policy: &'static str,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ReconcileError {
    /// Structural errors indicate a defect in the caller or the field
    /// configuration rather than in the activity data itself.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ReconcileError::InvalidUid(_)
                | ReconcileError::UnknownField(_)
                | ReconcileError::MergeConfig { .. }
        )
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, ReconcileError>;
