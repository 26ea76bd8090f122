use thiserror::Error;

/// Errors raised by rule graph mutations that would break a graph invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node '{0}' not found in the rule chain")]
    NodeNotFound(String),

    #[error("Edge '{0}' not found in the rule chain")]
    EdgeNotFound(String),

    #[error("Chain forward with index {0} not found")]
    ForwardNotFound(u32),

    #[error("Node '{source_id}' already has an outgoing connection labeled '{relation}'")]
    DuplicateRelation { source_id: String, relation: String },

    #[error("Node '{0}' is an external reference and cannot be edited")]
    ReadOnlyNode(String),

    #[error("No chain forward edit is in progress")]
    NoActiveForwardEdit,

    #[error("Draft for chain forward {draft} does not match the forward being edited ({active})")]
    ForwardEditMismatch { active: u32, draft: u32 },

    #[error("Connection from index {from_index} references missing node index {missing_index}")]
    InvalidConnection {
        from_index: usize,
        missing_index: usize,
    },
}

/// Failures reported by a remote expression checker, as opposed to a verdict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Unexpected validator response: {0}")]
    Unexpected(String),
}

/// Errors that can occur while loading editor settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Could not read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
