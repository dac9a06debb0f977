// Image dimension reader backed by `imagesize` (header parsing only)

use folio_core::port::MediaInspector;

#[derive(Default)]
pub struct ImageSizeInspector;

impl MediaInspector for ImageSizeInspector {
    fn dimensions(&self, bytes: &[u8], mime_type: &str) -> Option<(u32, u32)> {
        if !mime_type.starts_with("image/") {
            return None;
        }
        match imagesize::blob_size(bytes) {
            Ok(size) => Some((
                u32::try_from(size.width).ok()?,
                u32::try_from(size.height).ok()?,
            )),
            Err(e) => {
                tracing::debug!(error = %e, mime_type = %mime_type, "Could not read image size");
                None
            }
        }
    }
}
