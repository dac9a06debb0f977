// Media Storage Ports (object storage + file inspection)

use crate::error::Result;
use async_trait::async_trait;

/// Object storage for uploaded files
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store bytes under `key`
    ///
    /// # Returns
    /// Public URL of the stored object
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    /// Remove the object; deleting a missing object is not an error
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Reads metadata out of uploaded bytes
#[cfg_attr(test, mockall::automock)]
pub trait MediaInspector: Send + Sync {
    /// Pixel dimensions for supported image formats
    fn dimensions(&self, bytes: &[u8], mime_type: &str) -> Option<(u32, u32)>;
}
