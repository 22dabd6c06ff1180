//! Custom error types for the eval crate.

use std::fmt;

use text_tree::MalformedTree;

use crate::perturbation::PerturbationClass;

/// Top-level error type for the eval crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Error loading or parsing reference trees.
    Corpus(CorpusError),
    /// Error generating a perturbed variant.
    Perturbation(PerturbationError),
    /// One or more perturbation classes have no valid samples left.
    DegenerateCorpus {
        /// Classes without a single scored sample.
        classes: Vec<PerturbationClass>,
    },
    /// The evaluation was cancelled before every sample was scored.
    Cancelled {
        /// Samples scored before the cancellation was observed.
        scored: usize,
        /// Samples in the run.
        total: usize,
    },
    /// I/O error (for file operations).
    Io {
        /// The operation that failed.
        operation: String,
        /// Error message.
        message: String,
    },
    /// JSON serialization/deserialization error.
    Json {
        /// Context where error occurred.
        context: String,
        /// Error message.
        message: String,
    },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corpus(e) => write!(f, "corpus error: {e}"),
            Self::Perturbation(e) => write!(f, "perturbation error: {e}"),
            Self::DegenerateCorpus { classes } => {
                let names: Vec<&str> = classes.iter().map(|c| c.as_str()).collect();
                write!(
                    f,
                    "degenerate corpus: no valid samples for {}",
                    names.join(", ")
                )
            }
            Self::Cancelled { scored, total } => {
                write!(f, "evaluation cancelled after {scored} of {total} samples")
            }
            Self::Io { operation, message } => {
                write!(f, "I/O error during {operation}: {message}")
            }
            Self::Json { context, message } => {
                write!(f, "JSON error in {context}: {message}")
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Error in corpus operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusError {
    /// Empty corpus provided.
    EmptyCorpus,
    /// File not found.
    FileNotFound {
        /// Path that was not found.
        path: String,
    },
    /// Failed to read file.
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Error message.
        message: String,
    },
    /// JSON deserialization failed.
    JsonDeserialize {
        /// Path to the file.
        path: String,
        /// Error message from `serde_json`.
        message: String,
    },
    /// The JSON is valid but does not describe a tree.
    InvalidShape {
        /// Path to the file.
        path: String,
        /// What was wrong.
        message: String,
    },
    /// The decoded tree violates a tree invariant.
    Tree {
        /// Path to the file.
        path: String,
        /// The violated invariant.
        error: MalformedTree,
    },
    /// Directory not found or not a directory.
    InvalidDirectory {
        /// Path that was invalid.
        path: String,
    },
    /// No JSON files found in directory.
    NoFilesFound {
        /// Directory that was searched.
        directory: String,
    },
}

impl fmt::Display for CorpusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCorpus => write!(f, "corpus is empty"),
            Self::FileNotFound { path } => {
                write!(f, "tree file not found: '{path}'")
            }
            Self::ReadFailed { path, message } => {
                write!(f, "failed to read tree file '{path}': {message}")
            }
            Self::JsonDeserialize { path, message } => {
                write!(f, "failed to parse JSON in '{path}': {message}")
            }
            Self::InvalidShape { path, message } => {
                write!(f, "'{path}' does not describe a tree: {message}")
            }
            Self::Tree { path, error } => {
                write!(f, "invalid tree in '{path}': {error}")
            }
            Self::InvalidDirectory { path } => {
                write!(f, "invalid directory: '{path}' is not a directory or does not exist")
            }
            Self::NoFilesFound { directory } => {
                write!(f, "no JSON files found in directory '{directory}'")
            }
        }
    }
}

impl std::error::Error for CorpusError {}

/// Error generating a perturbed variant of a reference tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PerturbationError {
    /// The reference tree has no nodes.
    EmptyReference,
    /// No edit of the requested class applies to the reference.
    NoApplicableEdit {
        /// The requested class.
        class: PerturbationClass,
    },
    /// The edited tree failed validation.
    Tree(MalformedTree),
}

impl fmt::Display for PerturbationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyReference => write!(f, "reference tree is empty"),
            Self::NoApplicableEdit { class } => {
                write!(f, "no {class} edit applies to the reference tree")
            }
            Self::Tree(e) => write!(f, "perturbed tree is malformed: {e}"),
        }
    }
}

impl std::error::Error for PerturbationError {}

impl From<CorpusError> for EvalError {
    fn from(e: CorpusError) -> Self {
        Self::Corpus(e)
    }
}

impl From<PerturbationError> for EvalError {
    fn from(e: PerturbationError) -> Self {
        Self::Perturbation(e)
    }
}

impl From<MalformedTree> for PerturbationError {
    fn from(e: MalformedTree) -> Self {
        Self::Tree(e)
    }
}
