//! Error types for instance loading, model construction and evaluation.

use std::fmt;

/// Errors raised while loading an instance or evaluating a candidate.
///
/// Soft infeasibilities (late arrivals, penalized overload) are never
/// errors; they flow into the objective tiers instead.
#[derive(Debug)]
pub enum ModelError {
    /// The instance file violates its format contract.
    MalformedInstance(String),
    /// A structural property of the instance can never be satisfied.
    InfeasibleStructural(String),
    /// A sequence references a customer index outside the instance.
    EvaluationDomain {
        /// Offending index.
        index: usize,
        /// Number of customers in the instance.
        num_customers: usize,
    },
    /// Underlying I/O failure while reading an instance.
    Io(std::io::Error),
}

impl ModelError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        ModelError::MalformedInstance(msg.into())
    }

    pub(crate) fn infeasible(msg: impl Into<String>) -> Self {
        ModelError::InfeasibleStructural(msg.into())
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::MalformedInstance(msg) => write!(f, "malformed instance: {msg}"),
            ModelError::InfeasibleStructural(msg) => write!(f, "structurally infeasible: {msg}"),
            ModelError::EvaluationDomain {
                index,
                num_customers,
            } => write!(
                f,
                "customer index {index} is outside the domain 0..{num_customers}"
            ),
            ModelError::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io(err)
    }
}

/// Errors raised by an optimization engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// `solve` was called before any sequence variable was declared.
    EmptyModel,
    /// `solve` was called without a registered candidate evaluator.
    MissingEvaluator,
    /// A handle does not belong to this engine.
    UnknownVariable(usize),
    /// The engine could not produce an assignment.
    Failed(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::EmptyModel => write!(f, "model declares no sequence variables"),
            EngineError::MissingEvaluator => write!(f, "no candidate evaluator registered"),
            EngineError::UnknownVariable(id) => write!(f, "unknown sequence variable #{id}"),
            EngineError::Failed(msg) => write!(f, "engine failed: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
