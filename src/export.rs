//! Saving generated images to disk

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;

use crate::error::ExportError;
use crate::generation::decode_data_uri;
use crate::models::Category;

/// File name for a downloaded design, e.g. `komal-jewellery-ring-1715600000000.png`
pub fn download_file_name(category: Category) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("komal-jewellery-{}-{}.png", category, timestamp)
}

/// Writes the image behind `image_data` into `dest_dir`; returns the file path.
pub async fn download_image(
    image_data: &str,
    category: Category,
    dest_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let bytes = decode_data_uri(image_data)?;

    tokio::fs::create_dir_all(dest_dir).await?;

    let path = dest_dir.join(download_file_name(category));
    tokio::fs::write(&path, &bytes).await?;

    info!("[download_image] Saved {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}
