use axum::{
    extract::{Multipart, State},
    Json,
};
use mime::Mime;
use serde_json::{json, Value};
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

// POST /api/upload
//
// Accepts one multipart field named "image", stores it under the upload
// directory with a random name and returns the public URL to put in a
// post's image_url.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let upload_dir = &state.config.upload_dir;
    if !Path::new(upload_dir).exists() {
        fs::create_dir_all(upload_dir).await?;
    }

    while let Some(field) = multipart.next_field().await.map_err(|_| AppError::Validation {
        field: "image",
        message: "malformed multipart body",
    })? {
        if field.name() != Some("image") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload.jpg").to_string();
        let content_type: Option<Mime> = field
            .content_type()
            .and_then(|value| value.parse::<Mime>().ok());

        let extension = Path::new(&original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("jpg");
        let filename = format!("{}.{extension}", Uuid::new_v4());
        let filepath = format!("{upload_dir}/{filename}");

        let data = field.bytes().await.map_err(|_| AppError::Validation {
            field: "image",
            message: "could not read file",
        })?;

        if data.len() > MAX_IMAGE_BYTES {
            return Err(AppError::Validation {
                field: "image",
                message: "file exceeds the 5MB limit",
            });
        }

        if let Some(mime) = content_type {
            let allowed = matches!(
                (mime.type_().as_str(), mime.subtype().as_str()),
                ("image", "jpeg") | ("image", "png") | ("image", "webp") | ("image", "gif")
            );
            if !allowed {
                return Err(AppError::Validation {
                    field: "image",
                    message: "only jpeg, png, webp and gif are accepted",
                });
            }
        }

        fs::write(&filepath, data).await?;

        tracing::info!(%filename, %original_name, "image uploaded");
        return Ok(Json(json!({
            "url": format!("/uploads/{filename}"),
            "original_name": original_name,
        })));
    }

    Err(AppError::Validation {
        field: "image",
        message: "no field named 'image' was sent",
    })
}
