//! Argo CD Application fields
//!
//! A manifest opts into updates with a comment on its first key:
//!
//! ```yaml
//! # artifacthub: cilium/cilium
//! apiVersion: argoproj.io/v1alpha1
//! kind: Application
//! ```

use crate::yaml::Node;

/// Marker that introduces the Artifact Hub package identifier
pub const ANNOTATION_MARKER: &str = "# artifacthub:";

/// Kind of documents whose version is managed
pub const APPLICATION_KIND: &str = "Application";

const TARGET_REVISION: [&str; 3] = ["spec", "source", "targetRevision"];

/// Value of the top-level `kind` field
pub fn kind(doc: &Node) -> &str {
    doc.root().lookup(&["kind"])
}

pub fn is_application(doc: &Node) -> bool {
    kind(doc) == APPLICATION_KIND
}

/// Package identifier from the first key's head comment, or `""`
pub fn package_id(doc: &Node) -> &str {
    let root = doc.root();
    if !root.is_mapping() {
        return "";
    }

    root.first_key()
        .and_then(|key| key.head_comment.as_deref())
        .and_then(|comment| comment.lines().next())
        .and_then(|line| line.strip_prefix(ANNOTATION_MARKER))
        .map(str::trim)
        .unwrap_or("")
}

/// Current `spec.source.targetRevision`
pub fn target_revision(doc: &Node) -> &str {
    doc.root().lookup(&TARGET_REVISION)
}

pub fn set_target_revision(doc: &mut Node, version: &str) {
    doc.root_mut().set(&TARGET_REVISION, version);
}
