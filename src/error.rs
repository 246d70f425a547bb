use std::fmt::Display;
use std::path::PathBuf;

use thiserror::Error;

/// Region of a fort.14 file a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Description,
    Header,
    Nodes,
    Elements,
    OceanBoundaries,
    OtherBoundaries,
}

impl Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Section::Description => "description",
            Section::Header => "header",
            Section::Nodes => "nodes",
            Section::Elements => "elements",
            Section::OceanBoundaries => "open ocean boundaries",
            Section::OtherBoundaries => "land and flow boundaries",
        };

        write!(f, "{}", name)
    }
}

/// Reasons a mesh file can be rejected. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unable to open mesh file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read failure at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record at line {line} ({section}): {reason}: {text:?}")]
    MalformedRecord {
        line: usize,
        section: Section,
        text: String,
        reason: String,
    },

    #[error("input ended at line {line} ({section}) with {remaining} record(s) still expected")]
    TruncatedInput {
        line: usize,
        section: Section,
        remaining: usize,
    },

    #[error("unsupported element shape at line {line}: {vertex_count} vertices, only triangles are supported: {text:?}")]
    UnsupportedElementShape {
        line: usize,
        text: String,
        vertex_count: i64,
    },

    #[error("IBTYPE={ibtype} at line {line} is not a recognized boundary type: {text:?}")]
    UnknownBoundaryType {
        line: usize,
        text: String,
        ibtype: i64,
    },

    #[error("node index {index} at line {line} ({section}) is outside 1..={node_count}: {text:?}")]
    NodeIndexOutOfRange {
        line: usize,
        section: Section,
        text: String,
        index: i64,
        node_count: usize,
    },
}

impl ParseError {
    /// Line the error was raised on, if it is tied to one
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Open { .. } => None,
            ParseError::Read { line, .. }
            | ParseError::MalformedRecord { line, .. }
            | ParseError::TruncatedInput { line, .. }
            | ParseError::UnsupportedElementShape { line, .. }
            | ParseError::UnknownBoundaryType { line, .. }
            | ParseError::NodeIndexOutOfRange { line, .. } => Some(*line),
        }
    }
}

/// Failures while writing mesh data back out
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
