use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::info;

use crate::domain::{FolderName, LinkIdentifier};
use crate::error::CentaurusError;
use crate::library::{ArtifactLayout, Library};
use crate::metadata::MetadataRecord;
use crate::nfo::render_sidecar;
use crate::tmdb::MetadataClient;

/// The three inputs the front-end collects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddRequest {
    pub asset: String,
    pub name: String,
    pub link: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AddOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddResult {
    pub identifier: LinkIdentifier,
    pub folder: FolderName,
    pub record: MetadataRecord,
    pub sidecar: String,
    pub layout: Option<ArtifactLayout>,
    pub resolved_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveResult {
    pub identifier: LinkIdentifier,
    pub record: MetadataRecord,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Clone)]
pub struct App<C: MetadataClient> {
    library: Library,
    client: C,
}

impl<C: MetadataClient> App<C> {
    pub fn new(library: Library, client: C) -> Self {
        Self { library, client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Link → metadata → sidecar → library folder. Attempted once; any
    /// failure is returned as is.
    pub fn add(
        &self,
        request: &AddRequest,
        options: AddOptions,
        sink: &dyn ProgressSink,
    ) -> Result<AddResult, CentaurusError> {
        let asset = request.asset.trim();
        if asset.is_empty() {
            return Err(CentaurusError::MissingAssetPath);
        }
        let folder: FolderName = request.name.parse()?;
        let asset = Utf8PathBuf::from(asset);
        if !asset.as_std_path().is_file() {
            return Err(CentaurusError::MissingAsset(asset.to_string()));
        }

        let ResolveResult { identifier, record } = self.resolve(&request.link, sink)?;

        sink.event(ProgressEvent {
            message: "phase=Render; building sidecar".to_string(),
            elapsed: None,
        });
        let sidecar = render_sidecar(&record)?;

        let layout = if options.dry_run {
            None
        } else {
            sink.event(ProgressEvent {
                message: format!("phase=Store; writing {}", self.library.folder_dir(&folder)),
                elapsed: None,
            });
            Some(self.library.materialize(&folder, &asset, &sidecar)?)
        };

        info!(%identifier, %folder, dry_run = options.dry_run, "add finished");
        Ok(AddResult {
            identifier,
            folder,
            record,
            sidecar,
            layout,
            resolved_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    pub fn resolve(
        &self,
        link: &str,
        sink: &dyn ProgressSink,
    ) -> Result<ResolveResult, CentaurusError> {
        sink.event(ProgressEvent {
            message: "phase=Resolve; classifying link".to_string(),
            elapsed: None,
        });
        let identifier: LinkIdentifier = link.parse()?;

        sink.event(ProgressEvent {
            message: format!("phase=Fetch; tmdb.request {identifier}"),
            elapsed: None,
        });
        let start = Instant::now();
        let record = self.client.resolve(&identifier)?;
        let elapsed = start.elapsed();
        sink.event(ProgressEvent {
            message: format!("tmdb.response latency_ms={}", elapsed.as_millis()),
            elapsed: Some(elapsed),
        });

        Ok(ResolveResult { identifier, record })
    }
}
