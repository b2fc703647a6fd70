//! Graph-specific error types.

use cf_core::CfError;

pub type GraphResult<T> = Result<T, GraphError>;

/// Graph construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// No components were added.
    Empty,

    /// Two components or two connections share a label.
    DuplicateLabel { what: &'static str, label: String },

    /// A connection refers to a component that doesn't exist.
    InvalidCompRef { connection: String, index: usize },

    /// A connection uses a port index the component doesn't have.
    PortOutOfRange {
        connection: String,
        component: String,
        kind: &'static str,
        port: usize,
        available: usize,
    },

    /// Two connections attach to the same port.
    PortAlreadyConnected {
        component: String,
        kind: &'static str,
        port: usize,
    },

    /// A port has no connection.
    UnconnectedPort {
        component: String,
        kind: &'static str,
        port: usize,
    },

    /// A component declares a pass between ports it doesn't have.
    InvalidLayout { component: String },

    /// A cycle is not broken by a cycle closer.
    UnresolvedCycle { component: String },

    /// A fluid branch contains more than one cycle closer.
    MultipleCycleClosers { first: String, second: String },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::Empty => write!(f, "Network has no components"),
            GraphError::DuplicateLabel { what, label } => {
                write!(f, "Duplicate {} label '{}'", what, label)
            }
            GraphError::InvalidCompRef { connection, index } => {
                write!(
                    f,
                    "Connection '{}' refers to non-existent component {}",
                    connection, index
                )
            }
            GraphError::PortOutOfRange {
                connection,
                component,
                kind,
                port,
                available,
            } => write!(
                f,
                "Connection '{}' uses {} {} of '{}', which has {} {}s",
                connection, kind, port, component, available, kind
            ),
            GraphError::PortAlreadyConnected {
                component,
                kind,
                port,
            } => write!(
                f,
                "{} {} of '{}' is connected more than once",
                kind, port, component
            ),
            GraphError::UnconnectedPort {
                component,
                kind,
                port,
            } => write!(f, "{} {} of '{}' is not connected", kind, port, component),
            GraphError::InvalidLayout { component } => {
                write!(f, "Component '{}' has an invalid port layout", component)
            }
            GraphError::UnresolvedCycle { component } => write!(
                f,
                "Cycle through '{}' is not broken by a cycle closer",
                component
            ),
            GraphError::MultipleCycleClosers { first, second } => write!(
                f,
                "Cycle closers '{}' and '{}' sit on the same fluid branch",
                first, second
            ),
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for CfError {
    fn from(err: GraphError) -> Self {
        CfError::Invariant {
            what: err.to_string(),
        }
    }
}
