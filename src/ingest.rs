/// Image file ingestion
///
/// This module turns a picked file into slot contents: it reads the full
/// bytes, base64-encodes them for transport, sniffs the MIME type, and
/// builds the preview handle from the same bytes.
///
/// No file-type or size validation happens here. The pickers filter to
/// image extensions as a hint, but a non-image file is still accepted and
/// simply fails downstream at the model boundary.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rfd::AsyncFileDialog;

use crate::state::slots::{SlotImage, SLOT_COUNT};

/// Extensions offered by the file pickers (a hint, not a contract)
const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// Errors from reading a picked file
#[derive(Debug, Clone, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Ingest one file into slot contents.
///
/// Suspends until the file's bytes are fully read. The preview handle and
/// the encoded payload are derived from the same read, so they can never
/// disagree.
pub async fn ingest(path: PathBuf) -> Result<SlotImage, IngestError> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| IngestError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let mime_type = sniff_mime(&bytes, &path);
    let dimensions = read_dimensions(&bytes);
    let encoded = BASE64.encode(&bytes);
    let preview = iced::widget::image::Handle::from_bytes(bytes);

    println!(
        "📷 Ingested {} ({}, {}x{})",
        file_name, mime_type, dimensions.0, dimensions.1
    );

    Ok(SlotImage {
        file_name,
        mime_type,
        encoded,
        dimensions,
        preview,
    })
}

/// Show the multi-file picker and ingest up to nine files, in pick order.
///
/// Ingestion is sequential: each file is fully read before the next one
/// starts, so memory pressure stays bounded at one file. A cancelled dialog
/// returns an empty batch; any unreadable file aborts the whole batch so
/// the slots are never left half-updated.
pub async fn pick_and_ingest_bulk() -> Result<Vec<SlotImage>, IngestError> {
    let Some(files) = image_dialog("选择最多 9 张照片").pick_files().await else {
        return Ok(Vec::new());
    };

    let mut images = Vec::new();
    for file in files.into_iter().take(SLOT_COUNT) {
        images.push(ingest(file.path().to_path_buf()).await?);
    }
    Ok(images)
}

/// Show the single-file picker for one specific slot.
///
/// Returns `None` when the dialog is cancelled.
pub async fn pick_and_ingest_single() -> Option<Result<SlotImage, IngestError>> {
    let file = image_dialog("选择一张照片").pick_file().await?;
    Some(ingest(file.path().to_path_buf()).await)
}

fn image_dialog(title: &str) -> AsyncFileDialog {
    AsyncFileDialog::new()
        .set_title(title)
        .add_filter("图片", &IMAGE_EXTENSIONS)
}

/// Determine the MIME type to declare to the model.
///
/// Content sniffing first, file extension second. Unidentifiable bytes are
/// declared as an opaque octet stream and left for the model to reject.
fn sniff_mime(bytes: &[u8], path: &Path) -> String {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Read pixel dimensions from the image header without a full decode.
/// Returns (0, 0) for bytes the image crate cannot identify.
fn read_dimensions(bytes: &[u8]) -> (u32, u32) {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok())
        .unwrap_or((0, 0))
}
