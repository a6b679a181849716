//! Delivery collaborators for the Forward stage (`<command> | m <destination>`)
//!
//! The core only hands over `(destination, subject, body)`; how the text
//! travels is up to the implementation.

use async_trait::async_trait;
use chrono::Utc;
use opshell_foundation::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Delivers command output to an addressed destination
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Collaborator name (debugging)
    fn name(&self) -> &str;

    async fn deliver(&self, destination: &str, subject: &str, body: &str) -> Result<()>;
}

// ============================================================================
// DirectoryDelivery
// ============================================================================

/// Writes one text file per delivery under `<root>/<destination>/`
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
    root: PathBuf,
}

impl DirectoryDelivery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn mailbox(&self, destination: &str) -> Result<PathBuf> {
        let valid = !destination.is_empty()
            && !destination.starts_with('.')
            && destination
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
        if !valid {
            return Err(Error::delivery(destination, "invalid destination name"));
        }
        Ok(self.root.join(destination))
    }
}

#[async_trait]
impl Delivery for DirectoryDelivery {
    fn name(&self) -> &str {
        "directory"
    }

    async fn deliver(&self, destination: &str, subject: &str, body: &str) -> Result<()> {
        let mailbox = self.mailbox(destination)?;
        tokio::fs::create_dir_all(&mailbox)
            .await
            .map_err(|e| Error::delivery(destination, e.to_string()))?;

        let now = Utc::now();
        let id = uuid::Uuid::new_v4().simple().to_string();
        let file = mailbox.join(format!("{}-{}.txt", now.format("%Y%m%dT%H%M%S"), &id[..8]));

        let content = format!(
            "Subject: {}\nDate: {}\n\n{}\n",
            subject,
            now.to_rfc3339(),
            body
        );
        tokio::fs::write(&file, content)
            .await
            .map_err(|e| Error::delivery(destination, e.to_string()))?;

        debug!("Delivered '{}' to {}", subject, file.display());
        Ok(())
    }
}
