//! Reference corpus loading.
//!
//! Tree files are JSON in one of two shapes.
//!
//! # Nested form
//!
//! A single top-level key is the root; each value lists children as object
//! keys, in file order:
//!
//! ```json
//! {
//!   "Graph learning": {
//!     "Introduction": {},
//!     "Methods": { "Message passing": {}, "Spectral filters": null },
//!     "Results": ["Benchmarks", "Ablations"]
//!   }
//! }
//! ```
//!
//! A value may be an object (children by key), an array (strings are leaves,
//! objects contribute their keys), a string (one leaf child) or `null` / `{}`
//! (no children).
//!
//! # Outline form
//!
//! ```json
//! { "text": "Graph learning", "children": [ { "text": "Introduction" } ] }
//! ```
//!
//! An object is read in outline form when its only keys are `text` (a
//! string) and optionally `children`. A nested-form root that is literally
//! named `text` therefore has to list its children in an array or object:
//! `{"text": ["Introduction"]}` is a root `text` with one leaf, while
//! `{"text": "Introduction"}` is a single outline node.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use text_tree_eval::corpus::load_corpus_directory;
//!
//! let corpus = load_corpus_directory(Path::new("references/")).unwrap();
//! println!("Loaded {} trees from {} files", corpus.trees.len(), corpus.files_loaded);
//! ```

use std::path::Path;

use serde_json::{Map, Value};
use text_tree::{Outline, TextTree};

use crate::error::CorpusError;

/// Context string used for trees parsed from memory.
const INLINE: &str = "<inline>";

/// Reference trees loaded from a directory.
#[derive(Debug, Clone, Default)]
pub struct LoadedCorpus {
    /// Loaded trees, ordered by file name.
    pub trees: Vec<TextTree>,
    /// File stem of each tree.
    pub names: Vec<String>,
    /// Total files loaded.
    pub files_loaded: usize,
    /// Any warnings during loading (files that failed to parse).
    pub warnings: Vec<String>,
}

impl LoadedCorpus {
    /// Creates an empty `LoadedCorpus`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tree under `name`.
    pub fn add_tree(&mut self, name: impl Into<String>, tree: TextTree) {
        self.names.push(name.into());
        self.trees.push(tree);
    }

    /// Adds a warning message.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Returns true if there were any warnings during loading.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Parses a tree from a JSON string in either supported form.
///
/// # Errors
///
/// - `CorpusError::JsonDeserialize` if the text is not JSON
/// - `CorpusError::InvalidShape` if the JSON is not a tree
/// - `CorpusError::Tree` if a node text is empty
///
/// # Examples
///
/// ```
/// use text_tree_eval::corpus::parse_tree_json;
///
/// let tree = parse_tree_json(r#"{"Paper": {"Introduction": {}, "Results": "Table 1"}}"#).unwrap();
/// assert_eq!(tree.to_string(), "Paper\n-Introduction\n-Results\n--Table 1\n");
/// ```
pub fn parse_tree_json(json: &str) -> Result<TextTree, CorpusError> {
    parse_in(json, INLINE)
}

fn parse_in(json: &str, path: &str) -> Result<TextTree, CorpusError> {
    let value: Value = serde_json::from_str(json).map_err(|e| CorpusError::JsonDeserialize {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    let outline = value_to_outline(&value, path)?;
    TextTree::from_outline(&outline).map_err(|error| CorpusError::Tree {
        path: path.to_string(),
        error,
    })
}

/// Decodes a JSON value in either supported form into an outline.
///
/// # Errors
///
/// Returns `CorpusError::InvalidShape` if the value is not a tree.
pub fn value_to_outline(value: &Value, path: &str) -> Result<Outline, CorpusError> {
    let invalid = |message: String| CorpusError::InvalidShape {
        path: path.to_string(),
        message,
    };
    let Value::Object(map) = value else {
        return Err(invalid("top level must be an object".into()));
    };
    if is_outline_node(map) {
        return serde_json::from_value(value.clone()).map_err(|e| invalid(e.to_string()));
    }
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((root, children)), None) => Ok(Outline::new(root.clone(), nested_children(children, path)?)),
        (None, _) => Err(invalid("object has no root key".into())),
        (Some(_), Some(_)) => Err(invalid(format!(
            "expected a single root key, found {}",
            map.len()
        ))),
    }
}

fn is_outline_node(map: &Map<String, Value>) -> bool {
    matches!(map.get("text"), Some(Value::String(_)))
        && map.keys().all(|key| key == "text" || key == "children")
}

fn nested_children(value: &Value, path: &str) -> Result<Vec<Outline>, CorpusError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(text) => Ok(vec![Outline::leaf(text.clone())]),
        Value::Object(map) => keyed_children(map, path),
        Value::Array(items) => {
            let mut children = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(text) => children.push(Outline::leaf(text.clone())),
                    Value::Object(map) => children.extend(keyed_children(map, path)?),
                    other => {
                        return Err(CorpusError::InvalidShape {
                            path: path.to_string(),
                            message: format!("unsupported list item: {other}"),
                        });
                    }
                }
            }
            Ok(children)
        }
        other => Err(CorpusError::InvalidShape {
            path: path.to_string(),
            message: format!("unsupported node value: {other}"),
        }),
    }
}

fn keyed_children(map: &Map<String, Value>, path: &str) -> Result<Vec<Outline>, CorpusError> {
    map.iter()
        .map(|(text, value)| Ok(Outline::new(text.clone(), nested_children(value, path)?)))
        .collect()
}

/// Loads a single tree file.
///
/// # Errors
///
/// - `CorpusError::FileNotFound` if the path doesn't exist
/// - `CorpusError::ReadFailed` if the file can't be read
/// - any error of [`parse_tree_json`], tagged with the path
pub fn load_tree_file(path: &Path) -> Result<TextTree, CorpusError> {
    let path_str = path.display().to_string();

    if !path.exists() {
        return Err(CorpusError::FileNotFound { path: path_str });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| CorpusError::ReadFailed {
        path: path_str.clone(),
        message: e.to_string(),
    })?;

    parse_in(&contents, &path_str)
}

/// Loads all `*.json` tree files from a directory, sorted by file name.
///
/// Files that fail to load are skipped with warnings in the result.
///
/// # Errors
///
/// - `CorpusError::InvalidDirectory` if the path is not a directory
/// - `CorpusError::NoFilesFound` if no JSON files are found
pub fn load_corpus_directory(dir: &Path) -> Result<LoadedCorpus, CorpusError> {
    let dir_str = dir.display().to_string();

    if !dir.is_dir() {
        return Err(CorpusError::InvalidDirectory { path: dir_str });
    }

    let mut json_files: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| CorpusError::ReadFailed {
            path: dir_str.clone(),
            message: e.to_string(),
        })?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();

    if json_files.is_empty() {
        return Err(CorpusError::NoFilesFound { directory: dir_str });
    }
    json_files.sort();

    let mut corpus = LoadedCorpus::new();
    for path in json_files {
        match load_tree_file(&path) {
            Ok(tree) => {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                corpus.add_tree(name, tree);
                corpus.files_loaded += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping tree file");
                corpus.add_warning(format!("Failed to load '{}': {}", path.display(), e));
            }
        }
    }

    Ok(corpus)
}
