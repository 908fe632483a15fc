use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::api::error;
use crate::modules::upload::model::{ProgressFn, UploadedFile};

const CHUNK_SIZE: usize = 64 * 1024;

/// Moves a file blob to storage and returns the URL it is served from.
#[async_trait::async_trait]
pub trait FileTransport {
    async fn store(
        &self,
        file: &UploadedFile,
        progress: ProgressFn<'_>,
    ) -> Result<String, error::SystemError>;
}

/// Writes files under a local directory.
#[derive(Debug, Clone)]
pub struct LocalFileTransport {
    upload_dir: String,
    base_url: String,
}

impl LocalFileTransport {
    pub fn new(upload_dir: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self { upload_dir: upload_dir.into(), base_url: base_url.into() }
    }

    /// Generate unique filename
    fn generate_filename(&self, file: &UploadedFile) -> String {
        let extension = file.extension();
        let uuid = Uuid::now_v7();
        if extension.is_empty() {
            uuid.to_string()
        } else {
            format!("{}.{}", uuid, extension)
        }
    }
}

#[async_trait::async_trait]
impl FileTransport for LocalFileTransport {
    async fn store(
        &self,
        file: &UploadedFile,
        progress: ProgressFn<'_>,
    ) -> Result<String, error::SystemError> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let filename = self.generate_filename(file);
        let file_path = format!("{}/{}", self.upload_dir, filename);
        let mut out = tokio::fs::File::create(&file_path).await?;

        let total = file.bytes.len();
        let mut written = 0usize;
        let mut last_reported = 0u8;
        progress(&file.file_name, 0);

        for chunk in file.bytes.chunks(CHUNK_SIZE) {
            out.write_all(chunk).await?;
            written += chunk.len();
            let percent = ((written * 100) / total.max(1)).min(100) as u8;
            if percent > last_reported {
                last_reported = percent;
                progress(&file.file_name, percent);
            }
        }
        out.flush().await?;

        if last_reported < 100 {
            progress(&file.file_name, 100);
        }

        tracing::debug!("Stored {} ({} bytes) at {}", file.file_name, total, file_path);
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn store_writes_file_and_reports_monotonic_progress() {
        let dir = tempfile::tempdir().unwrap();
        let transport = LocalFileTransport::new(dir.path().to_string_lossy(), "/files");
        let file = UploadedFile::new("Poster.PNG", vec![7u8; CHUNK_SIZE * 3 + 10]);
        let seen = Mutex::new(Vec::new());

        let url = transport
            .store(&file, &|_name: &str, percent: u8| seen.lock().unwrap().push(percent))
            .await
            .unwrap();

        assert!(url.starts_with("/files/"));
        assert!(url.ends_with(".png"));
        let stored_name = url.trim_start_matches("/files/");
        let written = std::fs::read(dir.path().join(stored_name)).unwrap();
        assert_eq!(written.len(), file.bytes.len());

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn empty_file_still_completes() {
        let dir = tempfile::tempdir().unwrap();
        let transport = LocalFileTransport::new(dir.path().to_string_lossy(), "/files");
        let seen = Mutex::new(Vec::new());

        transport
            .store(&UploadedFile::new("empty.txt", Vec::new()), &|_: &str, p: u8| {
                seen.lock().unwrap().push(p)
            })
            .await
            .unwrap();

        assert_eq!(seen.into_inner().unwrap(), vec![0, 100]);
    }
}
