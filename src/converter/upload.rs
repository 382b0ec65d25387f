//! Receiving uploads into scoped temporary storage.

use chrono::{DateTime, Utc};
use formatfusion_av::format::extension_of;
use formatfusion_av::{Error, MediaKind, Result, Workspace};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A received upload and the temporary file that holds its bytes.
///
/// The file lives inside a private workspace and is deleted when the
/// `Upload` is dropped.
#[derive(Debug)]
pub struct Upload {
    id: Uuid,
    kind: MediaKind,
    filename: String,
    size: u64,
    received_at: DateTime<Utc>,
    path: PathBuf,
    workspace: Workspace,
}

/// Serializable view of an [`Upload`].
#[derive(Debug, Clone, Serialize)]
pub struct UploadRecord {
    pub id: Uuid,
    pub kind: MediaKind,
    pub filename: String,
    pub size: u64,
    pub received_at: DateTime<Utc>,
}

impl Upload {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Original file name as supplied by the client, without directories.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Path of the stored copy.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that holds the stored copy.
    pub fn workspace_dir(&self) -> &Path {
        self.workspace.path()
    }

    pub fn record(&self) -> UploadRecord {
        UploadRecord {
            id: self.id,
            kind: self.kind,
            filename: self.filename.clone(),
            size: self.size,
            received_at: self.received_at,
        }
    }
}

/// Store `data` for later conversion.
///
/// The file name must carry an extension from `kind`'s allowlist; the stored
/// copy keeps that extension (lower-cased) so ffmpeg can infer the input
/// format from it.
pub fn receive(
    kind: MediaKind,
    filename: &str,
    data: &[u8],
    temp_root: Option<&Path>,
) -> Result<Upload> {
    let filename = base_name(filename);

    if filename.is_empty() {
        return Err(Error::InvalidInput("Upload has no file name".to_string()));
    }

    if data.is_empty() {
        return Err(Error::InvalidInput(format!("Upload {:?} is empty", filename)));
    }

    let ext = extension_of(&filename)
        .filter(|_| kind.accepts_upload(&filename))
        .ok_or_else(|| {
            Error::unsupported_format(kind, extension_of(&filename).unwrap_or_default())
        })?;

    let workspace = Workspace::create(temp_root)?;
    let path = workspace.write_file(&format!("source.{ext}"), data)?;

    let upload = Upload {
        id: Uuid::new_v4(),
        kind,
        filename,
        size: data.len() as u64,
        received_at: Utc::now(),
        path,
        workspace,
    };

    tracing::info!(
        upload_id = %upload.id,
        kind = %kind,
        filename = %upload.filename,
        size_bytes = upload.size,
        "Received upload"
    );

    Ok(upload)
}

/// Strip any client-side directory components from a file name.
fn base_name(filename: &str) -> String {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_stores_bytes_with_lowercase_extension() {
        let upload = receive(MediaKind::Image, "Holiday.PNG", b"pixels", None).unwrap();
        assert_eq!(upload.filename(), "Holiday.PNG");
        assert_eq!(upload.size(), 6);
        assert_eq!(upload.path().file_name().unwrap(), "source.png");
        assert_eq!(std::fs::read(upload.path()).unwrap(), b"pixels");
    }

    #[test]
    fn test_drop_removes_stored_file() {
        let upload = receive(MediaKind::Audio, "song.wav", b"RIFF", None).unwrap();
        let path = upload.path().to_path_buf();
        let dir = upload.workspace_dir().to_path_buf();
        drop(upload);
        assert!(!path.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_rejects_extension_outside_allowlist() {
        let err = receive(MediaKind::Image, "animation.gif", b"GIF89a", None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));

        let err = receive(MediaKind::Video, "song.mp3", b"ID3", None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));

        let err = receive(MediaKind::Audio, "README", b"text", None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_rejects_empty_upload() {
        let err = receive(MediaKind::Image, "empty.png", b"", None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_client_directories_are_stripped() {
        let upload = receive(MediaKind::Video, "C:\\Users\\me\\clip.mp4", b"data", None).unwrap();
        assert_eq!(upload.filename(), "clip.mp4");

        let upload = receive(MediaKind::Video, "../../etc/clip.mov", b"data", None).unwrap();
        assert_eq!(upload.filename(), "clip.mov");
        assert!(upload.path().starts_with(upload.workspace_dir()));
    }

    #[test]
    fn test_receive_into_configured_root() {
        let root = tempfile::tempdir().unwrap();
        let upload = receive(MediaKind::Image, "a.bmp", b"BM", Some(root.path())).unwrap();
        assert!(upload.path().starts_with(root.path()));
    }

    #[test]
    fn test_record_matches_upload() {
        let upload = receive(MediaKind::Image, "a.tif", b"II*", None).unwrap();
        let record = upload.record();
        assert_eq!(record.id, upload.id());
        assert_eq!(record.kind, MediaKind::Image);
        assert_eq!(record.filename, "a.tif");
        assert_eq!(record.size, 3);
    }
}
