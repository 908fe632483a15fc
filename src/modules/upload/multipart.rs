use std::collections::HashMap;

use actix_multipart::Multipart;
use futures_util::TryStreamExt;

use crate::api::error;
use crate::modules::upload::model::UploadedFile;

/// A parsed multipart body: file parts plus plain text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str).filter(|v| !v.trim().is_empty())
    }
}

fn malformed(e: actix_multipart::MultipartError) -> error::Error {
    error::Error::bad_request(e.to_string())
}

pub async fn read_form(
    mut payload: Multipart,
    max_file_size: usize,
) -> Result<UploadForm, error::Error> {
    let mut form = UploadForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| error::Error::bad_request("Missing content disposition"))?
            .clone();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            if bytes.len() + chunk.len() > max_file_size {
                return Err(error::Error::payload_too_large(format!(
                    "File size exceeds maximum allowed size of {} bytes",
                    max_file_size
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match content_disposition.get_filename() {
            Some(filename) => {
                let mut file = UploadedFile::new(filename, bytes);
                if let Some(mime) = field.content_type() {
                    file = file.with_mime_type(mime.to_string());
                }
                form.files.push(file);
            }
            None => {
                let name = content_disposition.get_name().unwrap_or_default().to_string();
                let value = String::from_utf8(bytes).map_err(|_| {
                    error::Error::bad_request(format!("Field '{name}' is not valid UTF-8"))
                })?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}
