// Folio Infrastructure - Media Storage Adapters
// Implements: MediaStorage (local filesystem, Google Cloud Storage), MediaInspector

mod gcs;
mod inspector;
mod local;

pub use gcs::{GcsConfig, GcsMediaStore, GCS_API_BASE, GCS_PUBLIC_BASE};
pub use inspector::ImageSizeInspector;
pub use local::LocalMediaStore;

/// Join a base URL and an object key with exactly one slash
pub(crate) fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}
