//! Comment-preserving YAML documents
//!
//! Parsing keeps comments, key order and scalar styles so an edited file can
//! be written back with minimal noise in a diff.
//!
//! ```
//! use chartbump_core::yaml;
//!
//! let mut docs = yaml::parse("# pinned\nversion: 1.0.0\n").unwrap();
//! docs[0].root_mut().set(&["version"], "1.1.0");
//! assert_eq!(yaml::serialize(&docs).unwrap(), "# pinned\nversion: 1.1.0\n");
//! ```

mod emitter;
mod flow;
mod node;
mod parser;
mod scalar;

use std::path::Path;

use crate::error::{CoreError, Result};

pub use emitter::serialize;
pub use node::{Node, NodeKind, ScalarStyle};
pub use parser::parse;

/// Read and parse every document in a YAML file
pub fn read_documents(path: &Path) -> Result<Vec<Node>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CoreError::io("read yaml file", path.display().to_string(), e))?;
    parse(&content)
}

/// Serialize documents and replace the contents of `path`
pub fn write_documents(path: &Path, docs: &[Node]) -> Result<()> {
    let content = serialize(docs)?;
    std::fs::write(path, content).map_err(|e| {
        CoreError::persist(path.display().to_string(), format!("write {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_documents(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.yaml");
        std::fs::write(&path, "kind: Application # app\nspec: {}\n").unwrap();

        let mut docs = read_documents(&path).unwrap();
        docs[0].root_mut().set(&["kind"], "ApplicationSet");
        write_documents(&path, &docs).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "kind: ApplicationSet # app\nspec: {}\n");
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("app.yaml");
        let docs = parse("a: 1\n").unwrap();
        let err = write_documents(&path, &docs).unwrap_err();
        assert!(matches!(err, CoreError::Persist { .. }));
    }
}
