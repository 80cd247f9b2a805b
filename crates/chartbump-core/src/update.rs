//! Per-manifest update pipeline
//!
//! Each manifest goes through read, resolve, compare and, when a newer
//! stable version exists, mutate and persist. Any step can end the manifest
//! in an error; [`Updater::run`] stops at the first one.

use std::path::PathBuf;

use tracing::debug;

use crate::discovery::ChartInfo;
use crate::error::{CoreError, Result};
use crate::manifest;
use crate::persist::Persister;
use crate::resolver::{VersionResolver, VersionSource};
use crate::version;
use crate::yaml;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    Updated,
    Error,
}

/// Outcome for one manifest
#[derive(Debug)]
pub struct UpdateResult {
    pub file: String,
    pub repo: String,
    /// Version found in the manifest, empty if it could not be read
    pub current: String,
    /// Resolved version, empty if resolution did not happen
    pub latest: String,
    pub status: UpdateStatus,
    /// Set exactly when `status` is [`UpdateStatus::Error`]
    pub error: Option<CoreError>,
}

impl UpdateResult {
    fn start(chart: &ChartInfo) -> Self {
        Self {
            file: chart.file.clone(),
            repo: chart.repo.clone(),
            current: String::new(),
            latest: String::new(),
            status: UpdateStatus::Error,
            error: None,
        }
    }

    fn finish(mut self, status: UpdateStatus) -> Self {
        self.status = status;
        self
    }

    fn fail(mut self, error: CoreError) -> Self {
        self.status = UpdateStatus::Error;
        self.error = Some(error);
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == UpdateStatus::Error
    }
}

/// Runs the pipeline over discovered manifests
pub struct Updater<S, P> {
    dir: PathBuf,
    resolver: VersionResolver<S>,
    persister: P,
}

impl<S: VersionSource, P: Persister> Updater<S, P> {
    pub fn new(dir: impl Into<PathBuf>, resolver: VersionResolver<S>, persister: P) -> Self {
        Self {
            dir: dir.into(),
            resolver,
            persister,
        }
    }

    pub fn into_persister(self) -> P {
        self.persister
    }

    /// Process a single manifest
    pub async fn update(&mut self, chart: &ChartInfo) -> UpdateResult {
        let result = UpdateResult::start(chart);
        let path = self.dir.join(&chart.file);

        let mut docs = match yaml::read_documents(&path) {
            Ok(docs) => docs,
            Err(e) => return result.fail(e),
        };

        let current = docs
            .iter()
            .find(|doc| manifest::is_application(doc))
            .map(manifest::target_revision)
            .unwrap_or_default();
        if current.is_empty() {
            return result.fail(CoreError::MissingVersion {
                file: chart.file.clone(),
            });
        }
        let mut result = UpdateResult {
            current: current.to_string(),
            ..result
        };

        let latest = match self.resolver.latest(&chart.repo).await {
            Ok(latest) => latest,
            Err(e) => return result.fail(e),
        };
        result.latest = latest;
        debug!(file = %chart.file, current = %result.current, latest = %result.latest, "resolved");

        if !version::less(&result.current, &result.latest) {
            return result.finish(UpdateStatus::UpToDate);
        }

        for doc in docs.iter_mut().filter(|doc| manifest::is_application(doc)) {
            manifest::set_target_revision(doc, &result.latest);
        }

        match self.persister.persist(&path, &docs) {
            Ok(()) => result.finish(UpdateStatus::Updated),
            Err(e) => result.fail(e),
        }
    }

    /// Process manifests in order, handing each result to `on_result`
    ///
    /// Stops after the first failed manifest and returns its error.
    pub async fn run<F>(&mut self, charts: &[ChartInfo], mut on_result: F) -> Result<()>
    where
        F: FnMut(&UpdateResult),
    {
        for chart in charts {
            let mut result = self.update(chart).await;
            on_result(&result);

            if let Some(error) = result.error.take() {
                return Err(CoreError::Manifest {
                    file: result.file,
                    source: Box::new(error),
                });
            }
        }
        Ok(())
    }
}
