//! Reader for ADCIRC fort.14 unstructured triangular meshes.
//!
//! ```no_run
//! let mesh = fort14::parse_mesh("fort.14")?;
//! println!("{} nodes, {} elements", mesh.nodes.len(), mesh.elements.len());
//! # Ok::<(), fort14::ParseError>(())
//! ```

pub mod datatypes;
pub mod error;
pub mod parser;
pub mod post_processor;

pub use datatypes::Mesh;
pub use error::{ParseError, Section};
pub use parser::parse_mesh;
