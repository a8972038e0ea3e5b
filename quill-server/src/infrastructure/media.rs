use std::path::{Path, PathBuf};

use rand::RngExt;
use rand::distr::Alphanumeric;
use thiserror::Error;
use tracing::debug;

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];
const FILENAME_LEN: usize = 16;

#[derive(Debug, Error)]
pub(crate) enum MediaError {
    #[error("unsupported image type, allowed: jpg, jpeg, png, gif, webp")]
    UnsupportedType,

    #[error("file exceeds the {limit_bytes} byte limit")]
    TooLarge { limit_bytes: usize },

    #[error("failed to store upload")]
    Io(#[from] std::io::Error),
}

/// Filesystem store for uploaded post images. Files land in a flat directory
/// under a random name and are referenced by their public `/uploads/...` path.
pub(crate) struct LocalMediaStore {
    root: PathBuf,
    url_prefix: String,
    max_bytes: usize,
}

impl LocalMediaStore {
    pub(crate) fn new(root: impl Into<PathBuf>, url_prefix: &str, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Persists image bytes and returns the public path to reference them by.
    pub(crate) async fn save(
        &self,
        original_name: &str,
        data: &[u8],
    ) -> Result<String, MediaError> {
        if data.len() > self.max_bytes {
            return Err(MediaError::TooLarge {
                limit_bytes: self.max_bytes,
            });
        }

        let ext = allowed_extension(original_name).ok_or(MediaError::UnsupportedType)?;
        let filename = format!("{}.{ext}", random_stem());

        tokio::fs::create_dir_all(&self.root).await?;
        let target = self.root.join(&filename);
        tokio::fs::write(&target, data).await?;

        debug!(file = %target.display(), size = data.len(), "stored upload");
        Ok(format!("{}/{filename}", self.url_prefix))
    }
}

fn allowed_extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name)
        .extension()?
        .to_str()?
        .to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

fn random_stem() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(FILENAME_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{LocalMediaStore, MediaError, allowed_extension, random_stem};

    #[test]
    fn extension_whitelist_is_case_insensitive() {
        assert_eq!(allowed_extension("photo.PNG").as_deref(), Some("png"));
        assert_eq!(allowed_extension("photo.jpeg").as_deref(), Some("jpeg"));
        assert!(allowed_extension("script.sh").is_none());
        assert!(allowed_extension("noext").is_none());
    }

    #[test]
    fn random_stem_has_expected_length() {
        let stem = random_stem();
        assert_eq!(stem.len(), 16);
        assert!(stem.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn save_rejects_oversized_payload() {
        let store = LocalMediaStore::new(std::env::temp_dir(), "/uploads", 4);
        let err = store
            .save("big.png", &[0u8; 5])
            .await
            .expect_err("must reject");
        assert!(matches!(err, MediaError::TooLarge { limit_bytes: 4 }));
    }

    #[tokio::test]
    async fn save_writes_file_and_returns_public_path() {
        let root = std::env::temp_dir().join(format!("quill-media-test-{}", random_stem()));
        let store = LocalMediaStore::new(&root, "/uploads/", 1024);

        let public = store
            .save("avatar.JPG", b"not-really-a-jpg")
            .await
            .expect("save must succeed");
        assert!(public.starts_with("/uploads/"));
        assert!(public.ends_with(".jpg"));

        let filename = public.trim_start_matches("/uploads/");
        let stored = tokio::fs::read(root.join(filename))
            .await
            .expect("file must exist");
        assert_eq!(stored, b"not-really-a-jpg");

        tokio::fs::remove_dir_all(&root).await.ok();
    }
}
