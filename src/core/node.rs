use serde::Serialize;

use crate::error::{Error, Result};
use crate::sanitize::{sanitize, symbolize};
use crate::utils::validation;

/// The three name forms a node is known by across the monorepo.
///
/// `raw_name` is the user-supplied name, used verbatim as the directory and
/// binary name. `safe_name` is the sanitized flake identifier. `symbol_name`
/// is the capitalized form used to build the per-node getter binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeIdentity {
    pub raw_name: String,
    pub safe_name: String,
    pub symbol_name: String,
}

impl NodeIdentity {
    pub fn new(raw: &str) -> Result<Self> {
        let raw = validation::require_non_empty(raw, "name", "Node name cannot be empty")?;

        if raw.chars().any(|c| c.is_control() || c == '/' || c == '\\') {
            return Err(Error::validation_invalid_argument(
                "name",
                "Node name contains path separators or control characters",
                Some(raw.to_string()),
                None,
            ));
        }

        let safe_name = sanitize(raw);
        let symbol_name = symbolize(&safe_name);
        Ok(Self {
            raw_name: raw.to_string(),
            safe_name,
            symbol_name,
        })
    }

    /// Name of the getter binding in the master flake (`getMySensor`).
    pub fn getter(&self) -> String {
        format!("get{}", self.symbol_name)
    }

    /// Shell variable holding the launched node's PID in the demo script.
    ///
    /// Dashes are mapped to underscores so the result is a valid shell
    /// identifier.
    pub fn pid_var(&self) -> String {
        format!(
            "{}_PID",
            self.safe_name.replace('-', "_").to_ascii_uppercase()
        )
    }
}

/// Project kind: compiled Rust node or interpreted Python node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Binary,
    Script,
}

impl NodeKind {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "binary" => Ok(NodeKind::Binary),
            "script" => Ok(NodeKind::Script),
            other => Err(Error::validation_invalid_argument(
                "kind",
                format!("Invalid node kind '{}'", other),
                Some(other.to_string()),
                Some(vec!["binary".to_string(), "script".to_string()]),
            )),
        }
    }

    /// Human-readable label used in generated READMEs and status output.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Binary => "Rust",
            NodeKind::Script => "Python",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Binary => write!(f, "binary"),
            NodeKind::Script => write!(f, "script"),
        }
    }
}
