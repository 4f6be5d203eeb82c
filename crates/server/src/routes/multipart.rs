//! Multipart form reading shared by the upload handlers.

use axum::extract::Multipart;

use crate::error::AppError;
use crate::services::UploadedFile;

/// Parts of a multipart upload request.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// Files sent under the expected file field name.
    pub files: Vec<UploadedFile>,
    /// Value of the `data` text field, if sent.
    pub data: Option<String>,
}

/// Read every part of `multipart`, keeping files sent as `file_field` and
/// the `data` text field. Other fields are skipped.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the body is not valid multipart.
pub async fn read_upload_form(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();

        if name == "data" {
            form.data = Some(
                field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Read error: {e}")))?,
            );
        } else if name == file_field {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Read error: {e}")))?;

            if bytes.is_empty() {
                tracing::debug!(%file_name, "skipping empty file part");
                continue;
            }

            form.files.push(UploadedFile {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            tracing::debug!(field = %name, "ignoring multipart field");
        }
    }

    Ok(form)
}
