//! On-disk library of project photos

use crate::db::OwnerId;
use std::path::{Path, PathBuf};

/// Directory holding one `{owner_id}_{project_name}.jpg` file per project
#[derive(Debug, Clone)]
pub struct PhotoLibrary {
    dir: PathBuf,
}

impl PhotoLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File name used for a project's photo.
    ///
    /// Path separators in the project name are percent-escaped so the file
    /// always lands directly inside the library directory; `%` itself is
    /// escaped too, so distinct names never share a file.
    pub fn file_name(owner_id: OwnerId, project: &str) -> String {
        let mut safe = String::with_capacity(project.len());
        for c in project.chars() {
            match c {
                '%' => safe.push_str("%25"),
                '/' => safe.push_str("%2F"),
                '\\' => safe.push_str("%5C"),
                '\0' => safe.push_str("%00"),
                other => safe.push(other),
            }
        }
        format!("{owner_id}_{safe}.jpg")
    }

    /// Full path of a stored photo
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the photo bytes, replacing any previous photo of the project.
    /// Returns the file name to record in the catalog.
    pub async fn save(
        &self,
        owner_id: OwnerId,
        project: &str,
        bytes: &[u8],
    ) -> std::io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = Self::file_name(owner_id, project);
        tokio::fs::write(self.path(&file_name), bytes).await?;
        tracing::debug!(owner_id, project = %project, file = %file_name, "Stored project photo");
        Ok(file_name)
    }

    /// Move a stored photo to a new file name
    pub async fn rename(&self, from: &str, to: &str) -> std::io::Result<()> {
        tokio::fs::rename(self.path(from), self.path(to)).await
    }

    /// Whether a recorded photo is still on disk
    pub async fn exists(&self, file_name: &str) -> bool {
        tokio::fs::try_exists(self.path(file_name))
            .await
            .unwrap_or(false)
    }
}
