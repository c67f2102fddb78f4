use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use uuid::Uuid;

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Writes photo bytes under a fresh UUID name and returns the stored path.
pub fn save_photo(dir: &str, bytes: &[u8], content_type: &str) -> Result<String> {
    fs::create_dir_all(dir).with_context(|| format!("creating upload dir {}", dir))?;

    let filename = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
    let path = Path::new(dir).join(&filename);

    fs::write(&path, bytes).with_context(|| format!("writing photo {}", path.display()))?;

    Ok(path.to_string_lossy().into_owned())
}

/// Best-effort removal, the record is authoritative either way
pub fn remove_photo(path: &str) {
    if let Err(e) = fs::remove_file(path) {
        log::warn!("Failed to remove photo {}: {}", path, e);
    }
}
