use thiserror::Error;

/// Errors raised by the kinematic/dynamic model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{context}: dimension mismatch, expected {expected}, got {got}")]
    Dimension {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("mass matrix of manipulator '{name}' is numerically singular")]
    SingularMassMatrix { name: String },

    #[error("manipulator '{name}' not found")]
    ManipulatorNotFound { name: String },

    #[error("link '{name}' not found")]
    LinkNotFound { name: String },
}

/// Errors raised by tasks and the task-priority controller.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("task '{task}': goal must be {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    InvalidGoalShape {
        task: &'static str,
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("task '{task}' failed to update: {source}")]
    TaskUpdate {
        task: &'static str,
        #[source]
        source: Box<ControlError>,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}
