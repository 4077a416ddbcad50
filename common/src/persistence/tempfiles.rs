use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use tokio::fs;
use tracing::{info, warn};

use crate::util::random::generate_id;

/// Scratch directory owned by a single request.
///
/// The directory is removed by [`TempJobFileProvider::clean_up`], or on drop when the owning
/// request is cancelled before it gets there.
#[derive(Debug)]
pub struct TempJobFileProvider {
    job_directory: PathBuf,
    cleaned: bool,
}

impl TempJobFileProvider {
    pub async fn build(root: &Path) -> Result<TempJobFileProvider, &'static str> {
        let dir = root.join(generate_id());
        fs::create_dir_all(&dir).await.map_err(|_| "Could not create temp job directory")?;
        Ok(TempJobFileProvider { job_directory: dir, cleaned: false })
    }

    pub async fn clean_up(mut self) {
        self.cleaned = true;
        if let Err(err) = fs::remove_dir_all(&self.job_directory).await {
            warn!("Error occured, while deleting temp job files for {}: {}", self.job_directory.display(), &err)
        }
    }

    pub fn directory(&self) -> &Path {
        &self.job_directory
    }

    pub fn get_path(&self) -> PathBuf {
        self.job_directory.join(generate_id())
    }
}

impl Drop for TempJobFileProvider {
    fn drop(&mut self) {
        if !self.cleaned {
            if let Err(err) = std::fs::remove_dir_all(&self.job_directory) {
                warn!("Error occured, while dropping temp job files for {}: {}", self.job_directory.display(), &err)
            }
        }
    }
}

/// Removes job directories under `root` that were last modified more than `max_age` ago.
pub async fn sweep_stale(root: &Path, max_age: Duration) -> Result<usize, &'static str> {
    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(_) => return Err("Could not read temp root"),
    };
    let now = SystemTime::now();
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await.map_err(|_| "Could not read temp root")? {
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_dir() {
            continue;
        }
        let age = metadata.modified().ok().and_then(|modified| now.duration_since(modified).ok());
        if matches!(age, Some(age) if age > max_age) {
            match fs::remove_dir_all(entry.path()).await {
                Ok(()) => {
                    info!("Removed stale temp job directory {}", entry.path().display());
                    removed += 1;
                }
                Err(err) => warn!("Could not remove stale temp job directory {}: {}", entry.path().display(), err),
            }
        }
    }
    Ok(removed)
}
