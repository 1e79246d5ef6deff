use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tempfile::Builder;
use tracing::{debug, info};

use crate::domain::FolderName;
use crate::error::CentaurusError;

pub const METADATA_DIR: &str = "metadata";
pub const SIDECAR_EXT: &str = "nfo";

/// What `materialize` left on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactLayout {
    pub root: Utf8PathBuf,
    pub sidecar: Utf8PathBuf,
    pub asset: Utf8PathBuf,
    pub metadata_dir: Utf8PathBuf,
}

#[derive(Debug, Clone)]
pub struct Library {
    root: Utf8PathBuf,
}

impl Library {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn folder_dir(&self, folder: &FolderName) -> Utf8PathBuf {
        self.root.join(folder.as_str())
    }

    pub fn metadata_dir(&self, folder: &FolderName) -> Utf8PathBuf {
        self.folder_dir(folder).join(METADATA_DIR)
    }

    pub fn sidecar_path(&self, folder: &FolderName) -> Utf8PathBuf {
        self.folder_dir(folder)
            .join(format!("{}.{SIDECAR_EXT}", folder.as_str()))
    }

    pub fn asset_path(
        &self,
        folder: &FolderName,
        source: &Utf8Path,
    ) -> Result<Utf8PathBuf, CentaurusError> {
        let file_name = source
            .file_name()
            .ok_or_else(|| CentaurusError::MissingAsset(source.to_string()))?;
        Ok(self.folder_dir(folder).join(file_name))
    }

    /// Lays out `<root>/<folder>/` with the asset copy, the sidecar and an
    /// empty `metadata/` directory. Existing files of the same name are
    /// replaced. Directories created before a failing step are left behind.
    pub fn materialize(
        &self,
        folder: &FolderName,
        source: &Utf8Path,
        sidecar: &str,
    ) -> Result<ArtifactLayout, CentaurusError> {
        if !source.as_std_path().is_file() {
            return Err(CentaurusError::MissingAsset(source.to_string()));
        }
        let layout = ArtifactLayout {
            root: self.folder_dir(folder),
            sidecar: self.sidecar_path(folder),
            asset: self.asset_path(folder, source)?,
            metadata_dir: self.metadata_dir(folder),
        };

        ensure_dir(&layout.root)?;
        ensure_dir(&layout.metadata_dir)?;

        if same_file(source, &layout.asset) {
            debug!(asset = %layout.asset, "asset already in place");
        } else {
            copy_file_atomic(source, &layout.asset)?;
            debug!(from = %source, to = %layout.asset, "copied asset");
        }

        write_bytes_atomic(&layout.sidecar, sidecar.as_bytes())?;
        debug!(sidecar = %layout.sidecar, "wrote sidecar");

        info!(folder = %layout.root, "library entry written");
        Ok(layout)
    }
}

fn ensure_dir(path: &Utf8Path) -> Result<(), CentaurusError> {
    fs::create_dir_all(path.as_std_path())
        .map_err(|err| CentaurusError::Filesystem(format!("create {path}: {err}")))
}

fn same_file(a: &Utf8Path, b: &Utf8Path) -> bool {
    match (a.canonicalize_utf8(), b.canonicalize_utf8()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

pub fn copy_file_atomic(source: &Utf8Path, dest: &Utf8Path) -> Result<(), CentaurusError> {
    let parent = dest
        .parent()
        .ok_or_else(|| CentaurusError::Filesystem("invalid destination path".to_string()))?;
    let temp = Builder::new()
        .prefix(".centaurus-asset")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| CentaurusError::Filesystem(err.to_string()))?;
    fs::copy(source.as_std_path(), temp.path())
        .map_err(|err| CentaurusError::Filesystem(format!("copy {source}: {err}")))?;
    temp.persist(dest.as_std_path())
        .map_err(|err| CentaurusError::Filesystem(format!("persist {dest}: {err}")))?;
    Ok(())
}

pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), CentaurusError> {
    let tmp_path = Utf8PathBuf::from(format!("{path}.tmp"));
    fs::write(tmp_path.as_std_path(), content)
        .map_err(|err| CentaurusError::Filesystem(format!("write {tmp_path}: {err}")))?;
    fs::rename(tmp_path.as_std_path(), path.as_std_path())
        .map_err(|err| CentaurusError::Filesystem(format!("rename {path}: {err}")))?;
    Ok(())
}
