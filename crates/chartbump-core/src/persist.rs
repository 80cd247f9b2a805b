//! What happens to an updated document set
//!
//! [`FileWriter`] overwrites the manifest. [`DiffPreview`] leaves it alone
//! and prints what would change.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use console::style;
use similar::TextDiff;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::yaml::{self, Node};

/// Destination for mutated documents
pub trait Persister {
    fn persist(&mut self, path: &Path, docs: &[Node]) -> Result<()>;
}

/// Serialize and overwrite the original file
#[derive(Debug, Default, Clone, Copy)]
pub struct FileWriter;

impl Persister for FileWriter {
    fn persist(&mut self, path: &Path, docs: &[Node]) -> Result<()> {
        yaml::write_documents(path, docs)?;
        debug!(file = %path.display(), "wrote updated manifest");
        Ok(())
    }
}

/// Program used to render a preview
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiffTool {
    /// In-process unified diff
    #[default]
    Builtin,
    /// `git diff --no-index`
    Git,
}

impl std::str::FromStr for DiffTool {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "builtin" => Ok(DiffTool::Builtin),
            "git" => Ok(DiffTool::Git),
            other => Err(format!("unknown diff tool '{}' (expected builtin or git)", other)),
        }
    }
}

/// Print a diff between the file on disk and the mutated documents
pub struct DiffPreview<W> {
    tool: DiffTool,
    out: W,
}

impl DiffPreview<std::io::Stdout> {
    pub fn stdout(tool: DiffTool) -> Self {
        Self::new(tool, std::io::stdout())
    }
}

impl<W: Write> DiffPreview<W> {
    pub fn new(tool: DiffTool, out: W) -> Self {
        Self { tool, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn builtin(&mut self, path: &Path, updated: &str) -> Result<()> {
        let display = path.display().to_string();
        let original = std::fs::read_to_string(path)
            .map_err(|e| CoreError::persist(&display, format!("read {}: {}", display, e)))?;

        let diff = TextDiff::from_lines(original.as_str(), updated);
        let rendered = diff
            .unified_diff()
            .context_radius(3)
            .header(&display, &format!("{} (updated)", display))
            .to_string();

        for line in rendered.lines() {
            let line = if line.starts_with("+++") || line.starts_with("---") {
                style(line).bold()
            } else if line.starts_with('+') {
                style(line).green()
            } else if line.starts_with('-') {
                style(line).red()
            } else if line.starts_with("@@") {
                style(line).cyan()
            } else {
                style(line)
            };
            writeln!(self.out, "{}", line)
                .map_err(|e| CoreError::persist(&display, format!("write diff: {}", e)))?;
        }
        Ok(())
    }

    fn git(&mut self, path: &Path, updated: &str) -> Result<()> {
        let display = path.display().to_string();

        let mut temp = tempfile::Builder::new()
            .prefix("chartbump-")
            .suffix(".yaml")
            .tempfile()
            .map_err(|e| CoreError::persist(&display, format!("create temp file: {}", e)))?;
        temp.write_all(updated.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| CoreError::persist(&display, format!("write temp file: {}", e)))?;

        let color = if console::colors_enabled() { "--color=always" } else { "--color=never" };
        let output = Command::new("git")
            .args(["diff", "--no-index", color, "--"])
            .arg(path)
            .arg(temp.path())
            .output()
            .map_err(|e| CoreError::persist(&display, format!("run git diff: {}", e)))?;

        // Exit status 1 means the files differ
        match output.status.code() {
            Some(0) | Some(1) => {}
            _ => {
                return Err(CoreError::persist(
                    &display,
                    format!(
                        "git diff failed: {}",
                        String::from_utf8_lossy(&output.stderr).trim()
                    ),
                ));
            }
        }

        self.out
            .write_all(&output.stdout)
            .map_err(|e| CoreError::persist(&display, format!("write diff: {}", e)))
    }
}

impl<W: Write> Persister for DiffPreview<W> {
    fn persist(&mut self, path: &Path, docs: &[Node]) -> Result<()> {
        let updated = yaml::serialize(docs)?;
        match self.tool {
            DiffTool::Builtin => self.builtin(path, &updated),
            DiffTool::Git => self.git(path, &updated),
        }
    }
}
