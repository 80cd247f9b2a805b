//! Integration tests for the chartbump binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APP: &str = "\
# artifacthub: org/chart
apiVersion: argoproj.io/v1alpha1
kind: Application
metadata:
  name: chart
  namespace: argocd
spec:
  project: default
  source:
    chart: chart
    repoURL: https://charts.example.com
    # bumped by chartbump
    targetRevision: 1.0.0
  destination:
    server: https://kubernetes.default.svc
";

/// Helper to run chartbump inside `cwd` with a clean environment
fn chartbump(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chartbump"))
        .args(args)
        .current_dir(cwd)
        .env_remove("UPDATE_VERSION_DIR")
        .env_remove("ARTIFACTHUB_API_URL")
        .env_remove("RUST_LOG")
        .env_remove("CLICOLOR_FORCE")
        .output()
        .expect("Failed to execute chartbump")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Workspace with an `apps/` directory holding the given manifests
fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("apps")).unwrap();
    for (name, content) in files {
        fs::write(dir.path().join("apps").join(name), content).unwrap();
    }
    dir
}

fn read(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join("apps").join(name)).unwrap()
}

async fn registry(packages: &[(&str, &[&str])]) -> MockServer {
    let server = MockServer::start().await;
    for (package, versions) in packages {
        let versions: Vec<_> = versions.iter().map(|v| json!({ "version": v })).collect();
        Mock::given(method("GET"))
            .and(path(format!("/{}", package)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "available_versions": versions
            })))
            .mount(&server)
            .await;
    }
    server
}

mod options {
    use super::*;

    #[test]
    fn test_help() {
        let dir = TempDir::new().unwrap();
        let output = chartbump(dir.path(), &["--help"]);

        assert!(output.status.success());
        let out = stdout(&output);
        assert!(out.contains("--dry-run"));
        assert!(out.contains("UPDATE_VERSION_DIR"));
    }

    #[test]
    fn test_dry_run_and_check_conflict() {
        let dir = workspace(&[("app.yaml", APP)]);
        let output = chartbump(dir.path(), &["--dir", "apps", "--dry-run", "--check"]);

        assert_eq!(output.status.code(), Some(64));
        insta::assert_snapshot!(stderr(&output).trim(), @"✗ --dry-run and --check cannot be used together");
    }

    #[test]
    fn test_unknown_flag_is_usage_error() {
        let dir = TempDir::new().unwrap();
        let output = chartbump(dir.path(), &["--frobnicate"]);
        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn test_unknown_diff_tool() {
        let dir = workspace(&[("app.yaml", APP)]);
        let output = chartbump(dir.path(), &["--dir", "apps", "-n", "--diff-tool", "meld"]);

        assert_eq!(output.status.code(), Some(64));
        assert!(stderr(&output).contains("unknown diff tool"));
    }
}

mod discovery {
    use super::*;

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let output = chartbump(dir.path(), &["--dir", "nope", "--check"]);

        assert_eq!(output.status.code(), Some(1));
        insta::assert_snapshot!(stderr(&output).trim(), @"✗ cannot access directory: nope");
    }

    #[test]
    fn test_no_annotated_manifests() {
        let dir = workspace(&[("plain.yaml", "kind: Application\n")]);
        let output = chartbump(dir.path(), &["--dir", "apps", "--check"]);

        assert_eq!(output.status.code(), Some(1));
        insta::assert_snapshot!(stderr(&output).trim(), @"✗ no charts with artifacthub comments found in apps");
    }

    #[test]
    fn test_check_lists_manifests() {
        let other = APP.replace("org/chart", "acme/other");
        let dir = workspace(&[("b.yaml", APP), ("a.yml", other.as_str()), ("notes.txt", APP)]);
        // Never contacted in check mode
        let output = chartbump(
            dir.path(),
            &["--dir", "apps", "--check", "--api-url", "http://127.0.0.1:9"],
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let out = stdout(&output);
        assert!(out.contains("discovered 2 chart(s)"));
        let a = out.find("a.yml → acme/other").unwrap();
        let b = out.find("b.yaml → org/chart").unwrap();
        assert!(a < b);
        assert_eq!(read(&dir, "b.yaml"), APP);
    }

    #[test]
    fn test_directory_from_environment() {
        let dir = workspace(&[("app.yaml", APP)]);
        let output = Command::new(env!("CARGO_BIN_EXE_chartbump"))
            .arg("--check")
            .current_dir(dir.path())
            .env("UPDATE_VERSION_DIR", "apps")
            .env_remove("CLICOLOR_FORCE")
            .output()
            .unwrap();

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("app.yaml → org/chart"));
    }
}

mod update {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_updates_to_latest_stable() {
        let server = registry(&[("org/chart", &["1.0.0", "2.0.0", "2.1.0-rc1", "1.9.0"])]).await;
        let dir = workspace(&[("app.yaml", APP)]);

        let output = chartbump(dir.path(), &["--dir", "apps", "--api-url", &server.uri()]);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("app.yaml: 1.0.0 → 2.0.0"));
        assert_eq!(
            read(&dir, "app.yaml"),
            APP.replace("targetRevision: 1.0.0", "targetRevision: 2.0.0")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_already_up_to_date() {
        let server = registry(&[("org/chart", &["0.9.0", "1.0.0"])]).await;
        let dir = workspace(&[("app.yaml", APP)]);

        let output = chartbump(dir.path(), &["--dir", "apps", "--api-url", &server.uri()]);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("app.yaml: already up to date (1.0.0)"));
        assert_eq!(read(&dir, "app.yaml"), APP);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_dry_run_prints_diff() {
        let server = registry(&[("org/chart", &["1.2.0"])]).await;
        let dir = workspace(&[("app.yaml", APP)]);

        let output = chartbump(
            dir.path(),
            &["--dir", "apps", "--dry-run", "--api-url", &server.uri()],
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let out = stdout(&output);
        assert!(out.contains("-    targetRevision: 1.0.0"));
        assert!(out.contains("+    targetRevision: 1.2.0"));
        assert!(out.contains("app.yaml: 1.0.0 → 1.2.0"));
        assert_eq!(read(&dir, "app.yaml"), APP);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_only_prereleases_fails() {
        let server = registry(&[("org/chart", &["2.0.0-beta"])]).await;
        let dir = workspace(&[("app.yaml", APP)]);

        let output = chartbump(dir.path(), &["--dir", "apps", "--api-url", &server.uri()]);

        assert_eq!(output.status.code(), Some(1));
        insta::assert_snapshot!(stderr(&output).trim(), @"✗ app.yaml: no stable versions found");
        assert_eq!(read(&dir, "app.yaml"), APP);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stops_at_first_failure() {
        // org/missing is not served, so the registry answers 404
        let server = registry(&[("org/chart", &["3.0.0"])]).await;
        let missing = APP.replace("org/chart", "org/missing");
        let dir = workspace(&[("a.yaml", missing.as_str()), ("b.yaml", APP)]);

        let output = chartbump(dir.path(), &["--dir", "apps", "--api-url", &server.uri()]);

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("a.yaml: artifacthub HTTP 404"));
        assert_eq!(read(&dir, "b.yaml"), APP);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_other_documents_untouched() {
        let server = registry(&[("org/chart", &["2.0.0"])]).await;
        let secret = "apiVersion: v1\nkind: Secret\nmetadata:\n  name: creds\nstringData:\n  targetRevision: 1.0.0\n";
        let content = format!("{}---\n{}", secret, APP);
        let dir = workspace(&[("multi.yaml", content.as_str())]);

        let output = chartbump(dir.path(), &["--dir", "apps", "--api-url", &server.uri()]);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let written = read(&dir, "multi.yaml");
        assert!(written.starts_with(secret));
        assert!(written.ends_with(&APP.replace("1.0.0", "2.0.0")));
    }
}
