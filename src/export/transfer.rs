//! Streaming file copies with byte-level progress

use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::core::progress::{ProgressId, ProgressRegistry, TransferProgress};

/// Matches the 1 MiB high-water mark the copies have always streamed with
const COPY_BUFFER: usize = 1 << 20;

/// Suffix for in-flight copies; the rename to the final name happens only
/// after the full write, so a crash never leaves a file that looks complete
const PARTIAL_SUFFIX: &str = ".part";

/// One export run's copy context: the fixed-denominator byte aggregate and
/// the progress bar the run reports through.
pub struct Transfer<'a> {
    progress: &'a TransferProgress,
    registry: &'a ProgressRegistry,
    bar: &'a ProgressId,
}

impl<'a> Transfer<'a> {
    pub fn new(
        progress: &'a TransferProgress,
        registry: &'a ProgressRegistry,
        bar: &'a ProgressId,
    ) -> Self {
        Self {
            progress,
            registry,
            bar,
        }
    }

    /// Copy `src` to `dest`, streaming through a temporary `.part` path and
    /// renaming atomically on completion. Progress is recorded against the
    /// source path as bytes flow.
    pub async fn copy(&self, src: &Path, dest: &Path) -> std::io::Result<()> {
        let partial = partial_path(dest);

        let mut reader = tokio::fs::File::open(src).await?;
        let mut writer = tokio::fs::File::create(&partial).await?;
        let mut buffer = vec![0u8; COPY_BUFFER];

        loop {
            let read = reader.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            writer.write_all(&buffer[..read]).await?;
            let ratio = self.progress.record(src, read as u64);
            self.registry.set(self.bar, ratio);
        }

        writer.flush().await?;
        drop(writer);
        tokio::fs::rename(&partial, dest).await?;
        Ok(())
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(PARTIAL_SUFFIX);
    dest.with_file_name(name)
}
