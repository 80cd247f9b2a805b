//! Find annotated Application manifests in a directory

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::manifest;
use crate::yaml;

/// A manifest that opted into version updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartInfo {
    /// File name relative to the scanned directory
    pub file: String,
    /// Artifact Hub package (`org/name`)
    pub repo: String,
}

fn is_manifest_name(name: &str) -> bool {
    name.ends_with(".yaml") || name.ends_with(".yml")
}

/// Scan `dir` (non-recursively) for annotated manifests
///
/// Files whose resolved path leaves `dir`, unreadable files and malformed
/// YAML are skipped. Results are sorted by file name.
pub fn discover(dir: &Path) -> Result<Vec<ChartInfo>> {
    let dir_display = dir.display().to_string();

    let metadata = std::fs::metadata(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CoreError::NotFound {
            path: dir_display.clone(),
        },
        _ => CoreError::io("cannot access directory", &dir_display, e),
    })?;
    if !metadata.is_dir() {
        return Err(CoreError::NotADirectory { path: dir_display });
    }

    let root = dir
        .canonicalize()
        .map_err(|e| CoreError::io("resolve directory", &dir_display, e))?;
    let entries =
        std::fs::read_dir(dir).map_err(|e| CoreError::io("read directory", &dir_display, e))?;

    let mut charts = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| CoreError::io("read directory", &dir_display, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_manifest_name(&name) {
            continue;
        }

        let path = entry.path();
        // Follows symlinks so linked manifests count as regular files
        if !std::fs::metadata(&path).is_ok_and(|m| m.is_file()) {
            continue;
        }

        let resolved = match path.canonicalize() {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!(file = %name, error = %e, "skipping unresolvable file");
                continue;
            }
        };
        if !resolved.starts_with(&root) {
            warn!(file = %name, resolved = %resolved.display(), "skipping file outside of {}", dir_display);
            continue;
        }

        let docs = match yaml::read_documents(&resolved) {
            Ok(docs) => docs,
            Err(e) => {
                debug!(file = %name, error = %e, "skipping unparseable file");
                continue;
            }
        };

        let repo = docs
            .iter()
            .filter(|doc| manifest::is_application(doc))
            .map(manifest::package_id)
            .find(|id| !id.is_empty());

        match repo {
            Some(repo) => {
                debug!(file = %name, repo, "found annotated manifest");
                charts.push(ChartInfo {
                    file: name,
                    repo: repo.to_string(),
                });
            }
            None => debug!(file = %name, "no artifacthub annotation"),
        }
    }

    charts.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(charts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const APP: &str = "\
# artifacthub: org/chart
apiVersion: argoproj.io/v1alpha1
kind: Application
spec:
  source:
    targetRevision: 1.0.0
";

    fn write(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn test_discovers_annotated_application() {
        let dir = TempDir::new().unwrap();
        write(&dir, "app.yaml", APP);

        let charts = discover(dir.path()).unwrap();
        assert_eq!(
            charts,
            vec![ChartInfo {
                file: "app.yaml".to_string(),
                repo: "org/chart".to_string(),
            }]
        );
    }

    #[test]
    fn test_skips_unannotated_and_non_yaml() {
        let dir = TempDir::new().unwrap();
        write(&dir, "plain.yaml", "kind: Application\nspec: {}\n");
        write(&dir, "notes.txt", APP);
        write(&dir, "other.yml", "# artifacthub: org/other\nkind: ConfigMap\n");

        assert!(discover(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_skips_malformed_yaml() {
        let dir = TempDir::new().unwrap();
        write(&dir, "broken.yaml", "key: [invalid");
        write(&dir, "good.yml", APP);

        let charts = discover(dir.path()).unwrap();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].file, "good.yml");
    }

    #[test]
    fn test_ignores_subdirectories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested.yaml")).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("app.yaml"), APP).unwrap();

        assert!(discover(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_results_are_sorted() {
        let dir = TempDir::new().unwrap();
        write(&dir, "zeta.yaml", APP);
        write(&dir, "alpha.yaml", APP);
        write(&dir, "mid.yml", APP);

        let files: Vec<_> = discover(dir.path())
            .unwrap()
            .into_iter()
            .map(|c| c.file)
            .collect();
        assert_eq!(files, vec!["alpha.yaml", "mid.yml", "zeta.yaml"]);
    }

    #[test]
    fn test_application_after_other_documents() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "multi.yaml",
            "kind: Secret\nmetadata:\n  name: creds\n---\n# artifacthub: org/multi\nkind: Application\n",
        );

        let charts = discover(dir.path()).unwrap();
        assert_eq!(charts[0].repo, "org/multi");
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = discover(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let dir = TempDir::new().unwrap();
        write(&dir, "app.yaml", APP);
        let err = discover(&dir.path().join("app.yaml")).unwrap_err();
        assert!(matches!(err, CoreError::NotADirectory { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escaping_directory_is_skipped() {
        let outside = TempDir::new().unwrap();
        write(&outside, "secret.yaml", APP);

        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.yaml"),
            dir.path().join("escape.yaml"),
        )
        .unwrap();

        assert!(discover(dir.path()).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_directory_is_followed() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("store")).unwrap();
        std::fs::write(dir.path().join("store").join("real.yaml"), APP).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("store").join("real.yaml"),
            dir.path().join("link.yaml"),
        )
        .unwrap();

        let charts = discover(dir.path()).unwrap();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].file, "link.yaml");
    }
}
