use std::sync::Arc;

use crate::api::error;
use crate::modules::upload::{
    model::{ProgressFn, StoredFile, UploadConfig, UploadedFile},
    transport::FileTransport,
};

#[derive(Clone)]
pub struct UploadService {
    transport: Arc<dyn FileTransport + Send + Sync>,
    config: UploadConfig,
}

impl UploadService {
    pub fn new(transport: Arc<dyn FileTransport + Send + Sync>, config: UploadConfig) -> Self {
        Self { transport, config }
    }

    pub fn max_file_size(&self) -> usize {
        self.config.max_file_size
    }

    /// Validate file type and size
    pub fn validate_file(&self, file: &UploadedFile) -> Result<(), error::SystemError> {
        if file.file_name.trim().is_empty() {
            return Err(error::SystemError::bad_request("Missing filename"));
        }

        if file.bytes.len() > self.config.max_file_size {
            return Err(error::SystemError::too_large(format!(
                "File size exceeds maximum allowed size of {} bytes",
                self.config.max_file_size
            )));
        }

        let extension = file.extension();
        if !self.config.allowed_extensions.iter().any(|allowed| *allowed == extension) {
            return Err(error::SystemError::bad_request(format!(
                "File type '{}' is not allowed",
                extension
            )));
        }

        Ok(())
    }

    pub async fn store(
        &self,
        file: &UploadedFile,
        progress: ProgressFn<'_>,
    ) -> Result<StoredFile, error::SystemError> {
        self.validate_file(file)?;
        let url = self.transport.store(file, progress).await?;
        Ok(StoredFile {
            url,
            size: file.bytes.len() as i64,
            file_type: file.extension(),
            mime_type: file.resolved_mime_type(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::upload::model::ignore_progress;
    use crate::test::MemoryTransport;

    fn service(max_file_size: usize) -> UploadService {
        UploadService::new(
            Arc::new(MemoryTransport::default()),
            UploadConfig { max_file_size, ..UploadConfig::default() },
        )
    }

    #[tokio::test]
    async fn store_derives_type_and_mime() {
        let stored = service(1024)
            .store(&UploadedFile::new("Brief.PDF", vec![1, 2, 3]), &ignore_progress)
            .await
            .unwrap();

        assert_eq!(stored.file_type, "pdf");
        assert_eq!(stored.mime_type, "application/pdf");
        assert_eq!(stored.size, 3);
    }

    #[test]
    fn rejects_oversized_and_unknown_files() {
        let service = service(4);
        assert!(matches!(
            service.validate_file(&UploadedFile::new("a.png", vec![0; 5])),
            Err(error::SystemError::TooLarge(_))
        ));
        assert!(service.validate_file(&UploadedFile::new("a.exe", vec![0; 1])).is_err());
        assert!(service.validate_file(&UploadedFile::new("noext", vec![0; 1])).is_err());
        assert!(service.validate_file(&UploadedFile::new("a.mp3", vec![0; 4])).is_ok());
    }
}
