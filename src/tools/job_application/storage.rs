//! Artifact storage
//!
//! Generated PDFs are written under one output directory, then read back and
//! base64-encoded for the host runtime. Files are never cleaned up.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Local;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::core::JobToolResult;

/// A PDF that has been written to disk
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub path: PathBuf,
    pub size: usize,
    pub base64: String,
}

/// Writes generated documents into a directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `{action}_{YYYYMMDD_HHMMSS}_{8 hex}.pdf`
    ///
    /// The random suffix keeps two calls within the same second apart.
    pub fn file_name(action: &str) -> String {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}_{}_{}.pdf", action, timestamp, &suffix[..8])
    }

    /// Write `bytes` as a new file for `action`, then read it back and encode it
    pub async fn store_pdf(&self, action: &str, bytes: &[u8]) -> JobToolResult<StoredArtifact> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let path = self.output_dir.join(Self::file_name(action));
        tokio::fs::write(&path, bytes).await?;
        tracing::info!("Saved PDF: {}", path.display());

        let written = tokio::fs::read(&path).await?;
        Ok(StoredArtifact {
            size: written.len(),
            base64: STANDARD.encode(&written),
            path,
        })
    }
}
