//! Named operations and their per-attempt status.

use std::fmt;

use serde::Serialize;

/// A named asynchronous unit of work, tracked independently for
/// loading and error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    FetchList,
    Create,
    Update,
    Delete,
    BulkCreate,
    BulkUpdate,
    BulkDelete,
    /// Feature-specific operation such as an audit `rerun`.
    Custom(&'static str),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::FetchList => "fetchList",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::BulkCreate => "bulkCreate",
            Operation::BulkUpdate => "bulkUpdate",
            Operation::BulkDelete => "bulkDelete",
            Operation::Custom(name) => *name,
        }
    }

    /// Generic message used when a collaborator fails without one.
    pub fn fallback_message(&self, singular: &str, plural: &str) -> String {
        match self {
            Operation::FetchList => format!("Failed to fetch {}", plural),
            Operation::Create => format!("Failed to create {}", singular),
            Operation::Update => format!("Failed to update {}", singular),
            Operation::Delete => format!("Failed to delete {}", singular),
            Operation::BulkCreate => format!("Failed to create {}", plural),
            Operation::BulkUpdate => format!("Failed to update {}", plural),
            Operation::BulkDelete => format!("Failed to delete {}", plural),
            Operation::Custom(name) => format!("Failed to {} {}", name, singular),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Operation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Status of the most recent attempt of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationState {
    pub status: OperationStatus,
    pub error: Option<String>,
    /// Incremented every time the operation starts.
    pub attempt: u64,
}

impl OperationState {
    pub fn is_loading(&self) -> bool {
        self.status == OperationStatus::Pending
    }
}

/// Identifies a single attempt of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub operation: Operation,
    pub attempt: u64,
}
