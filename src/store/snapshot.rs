use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::app::Result;
use crate::domain::Post;
use crate::store::SnapshotStore;

/// One JSON document per blog under a directory.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Object key for a blog: hex SHA-256 of its URL.
    pub fn key(blog_url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(blog_url.as_bytes());
        format!("{}_posts.json", hex::encode(hasher.finalize()))
    }

    fn path_for(&self, blog_url: &str) -> PathBuf {
        self.dir.join(Self::key(blog_url))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, blog_url: &str) -> Result<Option<Vec<Post>>> {
        let bytes = match fs::read(self.path_for(blog_url)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, blog_url: &str, posts: &[Post]) -> Result<()> {
        let path = self.path_for(blog_url);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, serde_json::to_vec(posts)?)?;
        fs::rename(&tmp, &path)?;

        Ok(())
    }

    fn remove(&self, blog_url: &str) -> Result<()> {
        match fs::remove_file(self.path_for(blog_url)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
