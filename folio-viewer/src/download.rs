use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_core::{DocumentLoader, DownloadTarget};

/// Fetch the document again and write it to `dir/<file name>`.
pub async fn save(loader: &dyn DocumentLoader, target: &DownloadTarget, dir: &Path) -> Result<PathBuf> {
    let bytes = loader
        .fetch(&target.locator)
        .await
        .with_context(|| format!("Failed to fetch {}", target.locator))?;

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(&target.file_name);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
