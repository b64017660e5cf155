//! Error types for the environment runtime and its evaluator boundary.
//!
//! `EvalError` is what an evaluator reports. Factory functions
//! (`undefined_variable()`, ...) populate both the structured kind and the
//! rendered message, so callers match on `kind` and display `message`.
//!
//! `EnvError` is what the runtime's own operations report.

use std::fmt;

/// Result of evaluating an expression.
pub type EvalResult = Result<crate::Value, EvalError>;

/// Result of a runtime operation.
pub type EnvResult<T> = Result<T, EnvError>;

/// Typed error category of an evaluation failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    UndefinedVariable {
        name: String,
    },
    UndefinedNamespace {
        name: String,
    },
    NotCallable {
        type_name: String,
    },
    TypeMismatch {
        expected: String,
        got: String,
    },
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    MissingArgument {
        function: String,
        param: String,
    },
    UnusedArgument {
        function: String,
        arg: String,
    },
    /// A deferred binding was read while it was being forced.
    RecursivePromise,
    /// Attempt to define a binding in the empty environment.
    EmptyEnvAssignment,
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedVariable { name } => write!(f, "object `{name}` not found"),
            Self::UndefinedNamespace { name } => {
                write!(f, "there is no package called `{name}`")
            }
            Self::NotCallable { type_name } => {
                write!(f, "attempt to apply non-function of type {type_name}")
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "{name} expects {expected} {arg_word}, got {got}")
            }
            Self::MissingArgument { function, param } => {
                write!(f, "argument `{param}` of {function}() is missing")
            }
            Self::UnusedArgument { function, arg } => {
                write!(f, "unused argument `{arg}` in {function}()")
            }
            Self::RecursivePromise => write!(f, "promise already under evaluation"),
            Self::EmptyEnvAssignment => {
                write!(f, "cannot assign values in the empty environment")
            }
            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// An evaluation failure reported across the evaluator boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory-made errors.
    pub message: String,
}

impl EvalError {
    /// Create an error with just a message (`Custom` kind).
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        EvalError {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError { kind, message }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

// Factory functions

pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

pub fn undefined_namespace(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedNamespace {
        name: name.to_string(),
    })
}

pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

pub fn wrong_arg_count(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

pub fn missing_argument(function: &str, param: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingArgument {
        function: function.to_string(),
        param: param.to_string(),
    })
}

pub fn unused_argument(function: &str, arg: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnusedArgument {
        function: function.to_string(),
        arg: arg.to_string(),
    })
}

pub fn recursive_promise() -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursivePromise)
}

pub fn empty_env_assignment() -> EvalError {
    EvalError::from_kind(EvalErrorKind::EmptyEnvAssignment)
}

/// Failure of a runtime operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    /// An argument is not of the required kind.
    #[error("`{param}` must be {expected}")]
    TypeMismatch {
        param: &'static str,
        expected: &'static str,
    },
    /// A name did not resolve. Carries the evaluator's own error so the
    /// presentation matches ordinary name resolution.
    #[error("{0}")]
    NotFound(EvalError),
    /// A state this crate asserts can never occur.
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("can't parse `{text}`: {message}")]
    Parse { text: String, message: String },
    #[error("the environment runtime is not initialized")]
    NotInitialized,
    #[error("the environment runtime is already initialized")]
    AlreadyInitialized,
}

impl EnvError {
    pub fn type_mismatch(param: &'static str, expected: &'static str) -> Self {
        EnvError::TypeMismatch { param, expected }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        EnvError::Internal(message.into())
    }
}
