//! # Avatar Files
//!
//! User images live under `<public>/img/users` and are served back by the
//! static file handler at `/img/users/<name>`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use super::errors::{UploadError, UploadResult};

/// Directory under the public folder holding user avatars
pub const USERS_IMAGE_DIR: &str = "img/users";

/// One file taken from a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Reject files larger than `limit` bytes
    pub fn check_size(&self, limit: u64) -> UploadResult<()> {
        if self.size() > limit {
            return Err(UploadError::FileTooLarge(self.size(), limit));
        }
        Ok(())
    }
}

/// Writes avatar images into the public folder
#[derive(Debug, Clone)]
pub struct AvatarStore {
    public_dir: PathBuf,
}

impl AvatarStore {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    /// Directory the files are written to
    pub fn directory(&self) -> PathBuf {
        self.public_dir.join(USERS_IMAGE_DIR)
    }

    /// Store `data` as `file_name`, returning the public URL path
    pub async fn save(&self, file_name: &str, data: &[u8]) -> UploadResult<String> {
        let file_name = sanitize_file_name(file_name)?;
        let dir = self.directory();

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| UploadError::IoError(e.to_string()))?;
        fs::write(dir.join(&file_name), data)
            .await
            .map_err(|e| UploadError::IoError(e.to_string()))?;

        info!(file = %file_name, bytes = data.len(), "avatar stored");
        Ok(public_path(&file_name))
    }
}

/// URL path under which a stored avatar is served
pub fn public_path(file_name: &str) -> String {
    format!("/{}/{}", USERS_IMAGE_DIR, file_name)
}

/// `stem` plus the extension of `original` (`"abc"`, `"me.gif"` -> `"abc.gif"`)
pub fn name_with_extension(stem: &str, original: &str) -> String {
    match Path::new(original).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", stem, ext),
        _ => stem.to_string(),
    }
}

/// Keep only the final path component of a client-supplied name
pub fn sanitize_file_name(name: &str) -> UploadResult<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "." || base == ".." {
        return Err(UploadError::InvalidFileName(name.to_string()));
    }
    Ok(base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_name_with_extension() {
        assert_eq!(name_with_extension("3kg6a8l5", "me.gif"), "3kg6a8l5.gif");
        assert_eq!(name_with_extension("3kg6a8l5", "archive.tar.gz"), "3kg6a8l5.gz");
        assert_eq!(name_with_extension("3kg6a8l5", "noext"), "3kg6a8l5");
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_file_name("C:\\images\\cat.png").unwrap(), "cat.png");
        assert!(sanitize_file_name("..").is_err());
        assert!(sanitize_file_name("dir/").is_err());
    }

    #[test]
    fn test_size_limit() {
        let file = UploadedFile {
            file_name: "a.png".into(),
            content_type: "image/png".into(),
            data: vec![0; 10],
        };
        assert!(file.check_size(10).is_ok());
        assert!(matches!(file.check_size(9), Err(UploadError::FileTooLarge(10, 9))));
    }

    #[tokio::test]
    async fn test_save_writes_under_public_folder() {
        let temp = TempDir::new().unwrap();
        let avatars = AvatarStore::new(temp.path());

        let url = avatars.save("abc.gif", b"GIF89a").await.unwrap();

        assert_eq!(url, "/img/users/abc.gif");
        let stored = std::fs::read(temp.path().join("img/users/abc.gif")).unwrap();
        assert_eq!(stored, b"GIF89a");
    }
}
