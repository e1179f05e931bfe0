//! Reference material loader
//!
//! Reads the top level of a configured directory and concatenates the text
//! files it finds into one blob for the system prompt. A missing directory
//! is created and yields an empty blob. Files that cannot be used are logged
//! and skipped without failing the load.

use std::path::{Path, PathBuf};

use tokio::fs;

/// Extensions read as plain text
const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Reads reference text from a directory on every call
#[derive(Debug, Clone)]
pub struct KnowledgeLoader {
    dir: PathBuf,
    max_file_size: u64,
}

impl KnowledgeLoader {
    pub fn new(dir: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            dir: dir.into(),
            max_file_size,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load and concatenate every usable file, in file-name order.
    pub async fn load(&self) -> Result<String, KnowledgeError> {
        if !fs::try_exists(&self.dir).await? {
            fs::create_dir_all(&self.dir).await?;
            tracing::info!("Created knowledge directory {}", self.dir.display());
            return Ok(String::new());
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            paths.push(entry.path());
        }
        // read_dir order is platform-dependent
        paths.sort();

        let mut sections = Vec::new();
        for path in paths {
            if let Some(section) = self.load_file(&path).await {
                sections.push(section);
            }
        }

        Ok(sections.join("\n\n"))
    }

    async fn load_file(&self, path: &Path) -> Option<String> {
        let name = path.file_name()?.to_string_lossy().to_string();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if ext == "pdf" {
            tracing::info!("Skipping PDF file: {}", name);
            return None;
        }
        if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
            tracing::debug!("Skipping unsupported file: {}", name);
            return None;
        }

        let metadata = match fs::metadata(path).await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Error reading {}: {}", name, e);
                return None;
            }
        };
        if !metadata.is_file() {
            return None;
        }
        if metadata.len() > self.max_file_size {
            tracing::warn!(
                "Skipping {}: {} bytes exceeds limit of {}",
                name,
                metadata.len(),
                self.max_file_size
            );
            return None;
        }

        match fs::read_to_string(path).await {
            Ok(content) => Some(format!("--- {} ---\n{}", name, content)),
            Err(e) => {
                tracing::warn!("Error loading {}: {}", name, e);
                None
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("Knowledge directory error: {0}")]
    Io(#[from] std::io::Error),
}
