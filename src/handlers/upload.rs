use std::collections::HashMap;

use axum::{extract::Multipart, response::Response};

use crate::middleware::reject_with_upload;
use crate::storage::ImageStore;

/// Field that carries the uploaded image in multipart forms.
const IMAGE_FIELD: &str = "image";

/// Text fields plus the stored image of a multipart form.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub image: Option<String>,
}

impl UploadForm {
    /// Reads every field, storing the image as it streams in. On failure the
    /// returned response still references the stored image so it gets cleaned up.
    pub async fn read(mut multipart: Multipart, images: &ImageStore) -> Result<Self, Response> {
        let mut form = UploadForm::default();

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => return Err(reject_with_upload(e, form.image.as_deref())),
            };

            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => return Err(reject_with_upload(e, form.image.as_deref())),
                };

                let stored = match images.save(&content_type, &bytes).await {
                    Ok(path) => path,
                    Err(e) => return Err(reject_with_upload(e, form.image.as_deref())),
                };

                // Last image wins
                if let Some(previous) = form.image.replace(stored) {
                    images.remove(&previous).await;
                }
            } else {
                match field.text().await {
                    Ok(text) => {
                        form.fields.insert(name, text);
                    }
                    Err(e) => return Err(reject_with_upload(e, form.image.as_deref())),
                }
            }
        }

        Ok(form)
    }

    /// Takes a text field, defaulting to empty so validation reports it.
    pub fn take(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }
}

