use crate::error::SelectionError;
use crate::upload::types::{FramePreview, SelectedFile};
use std::path::{Path, PathBuf};

pub const MAX_FILES: usize = 3;

pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime.to_ascii_lowercase().as_str())
}

/// Keeps allowed image types in their original order, capped at [`MAX_FILES`].
pub fn filter_selection(files: Vec<SelectedFile>) -> Vec<SelectedFile> {
    files
        .into_iter()
        .filter(|file| is_allowed_mime(&file.mime))
        .take(MAX_FILES)
        .collect()
}

/// Builds the preview strip: one entry per file, padded with the first file
/// until there are [`MAX_FILES`] frames.
pub fn frame_previews(files: &[SelectedFile]) -> Vec<FramePreview> {
    let Some(first) = files.first() else {
        return Vec::new();
    };

    files
        .iter()
        .chain(std::iter::repeat(first))
        .take(MAX_FILES)
        .enumerate()
        .map(|(index, file)| FramePreview {
            label: format!("Frame {}", index + 1),
            file: file.clone(),
        })
        .collect()
}

/// MIME type from the extension, the way a browser fills in `File.type`.
pub fn guess_mime(path: impl AsRef<Path>) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_default()
}

/// One entry of a pick or drop: either a path still on disk or contents that
/// arrived with the event.
#[derive(Debug, Clone, PartialEq)]
pub enum PickedFile {
    Path(PathBuf),
    InMemory(SelectedFile),
}

impl PickedFile {
    pub fn mime(&self) -> String {
        match self {
            PickedFile::Path(path) => guess_mime(path),
            PickedFile::InMemory(file) => file.mime.clone(),
        }
    }

    pub async fn load(self) -> Result<SelectedFile, SelectionError> {
        match self {
            PickedFile::Path(path) => load_file(&path).await,
            PickedFile::InMemory(file) => Ok(file),
        }
    }
}

/// Applies the type filter and the [`MAX_FILES`] cap before anything is read
/// from disk.
pub fn filter_picked(picked: Vec<PickedFile>) -> Vec<PickedFile> {
    picked
        .into_iter()
        .filter(|file| is_allowed_mime(&file.mime()))
        .take(MAX_FILES)
        .collect()
}

pub async fn load_file(path: &Path) -> Result<SelectedFile, SelectionError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| SelectionError::InvalidName(path.to_path_buf()))?;

    let mime = guess_mime(path);

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| SelectionError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(SelectedFile::new(name, mime, bytes))
}
