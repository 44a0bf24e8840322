//! Artifact retrieval: download a finished result archive and extract
//! it into the task's public output directory.

use std::path::Path;

use futures::StreamExt;
use panomax_core::archive::{self, ArchiveError};
use panomax_core::types::TaskId;
use tokio::io::AsyncWriteExt;

/// Directory under the public root where extracted results live.
const IMAGES_DIR: &str = "images";

/// Errors from result retrieval.
#[derive(Debug, thiserror::Error)]
pub enum RetrieveError {
    /// The HTTP request itself failed (network, DNS, TLS).
    #[error("Download request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The artifact host returned a non-2xx status.
    #[error("Download failed with status {status}")]
    Download {
        /// HTTP status code.
        status: u16,
    },

    /// Filesystem I/O failed (output directory, archive file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The downloaded archive could not be safely extracted.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The blocking extraction task panicked.
    #[error("Extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Download the archive at `url` and extract it under
/// `{public_dir}/images/{task_id}/`.
///
/// Returns the extracted file paths relative to the task's output
/// directory, ready for the client notification. Extraction runs
/// through [`archive::extract_archive`], so an entry escaping the
/// output directory aborts the whole operation.
pub async fn fetch_and_extract(
    client: &reqwest::Client,
    url: &str,
    task_id: TaskId,
    public_dir: &Path,
) -> Result<Vec<String>, RetrieveError> {
    let out_dir = public_dir.join(IMAGES_DIR).join(task_id.to_string());
    tokio::fs::create_dir_all(&out_dir).await?;

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(RetrieveError::Download {
            status: status.as_u16(),
        });
    }

    // Stream the body straight to disk; result archives can be large
    // and must not be buffered whole in memory.
    let archive_path = out_dir.join("output.zip");
    let mut file = tokio::fs::File::create(&archive_path).await?;
    let mut stream = response.bytes_stream();
    let mut bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        bytes += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    drop(file);
    tracing::debug!(task_id, bytes, "Downloaded result archive");

    // The zip walk is synchronous; keep it off the async workers.
    let extracted =
        tokio::task::spawn_blocking(move || archive::extract_archive(&archive_path, &out_dir))
            .await??;

    tracing::info!(task_id, files = extracted.len(), "Extracted result archive");
    Ok(extracted)
}
