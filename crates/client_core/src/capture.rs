//! Image capture for the banner form.
//!
//! Files arrive either from the file picker or from a drag-and-drop, and both
//! paths go through the same filter: only image types are kept.

use image_generation::SourceImage;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(filename: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type,
            bytes,
        }
    }

    /// Declared content type, or one guessed from the file name when the
    /// declared type is missing or generic.
    pub fn effective_mime_type(&self) -> String {
        match self.mime_type.as_deref().map(str::trim) {
            Some(declared) if !declared.is_empty() && declared != "application/octet-stream" => {
                declared.to_ascii_lowercase()
            }
            _ => mime_guess::from_path(&self.filename)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.effective_mime_type().starts_with("image/")
    }

    pub fn to_source_image(&self) -> SourceImage {
        SourceImage {
            mime_type: self.effective_mime_type(),
            bytes: self.bytes.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewHandle(u64);

impl PreviewHandle {
    pub fn from_id(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    Picker,
    DragDrop,
}

impl CaptureSource {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "picker" | "select" => Some(Self::Picker),
            "drop" | "drag_drop" | "dragdrop" => Some(Self::DragDrop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file: ImageFile,
    pub preview: PreviewHandle,
}

/// Ordered list of staged images. A preview handle resolves only while its
/// image is still staged; removing or clearing releases it, and handles are
/// never handed out twice.
#[derive(Debug, Default)]
pub struct ImageCapture {
    images: Vec<UploadedImage>,
    next_handle: u64,
}

impl ImageCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every acceptable file in order and returns how many were kept.
    pub fn add_files(
        &mut self,
        source: CaptureSource,
        files: impl IntoIterator<Item = ImageFile>,
    ) -> usize {
        let mut accepted = 0;
        for file in files {
            if file.bytes.is_empty() || !file.is_image() {
                debug!(
                    ?source,
                    filename = %file.filename,
                    mime_type = %file.effective_mime_type(),
                    "skipping non-image file"
                );
                continue;
            }
            self.next_handle += 1;
            self.images.push(UploadedImage {
                file,
                preview: PreviewHandle(self.next_handle),
            });
            accepted += 1;
        }
        accepted
    }

    pub fn remove(&mut self, index: usize) -> Option<UploadedImage> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    /// Releases every staged image and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let released = self.images.len();
        self.images.clear();
        released
    }

    pub fn preview(&self, handle: PreviewHandle) -> Option<&ImageFile> {
        self.images
            .iter()
            .find(|image| image.preview == handle)
            .map(|image| &image.file)
    }

    pub fn images(&self) -> &[UploadedImage] {
        &self.images
    }

    /// Number of preview handles that still resolve.
    pub fn live_previews(&self) -> usize {
        self.images.len()
    }

    pub fn files(&self) -> Vec<ImageFile> {
        self.images.iter().map(|image| image.file.clone()).collect()
    }

    pub fn source_images(&self) -> Vec<SourceImage> {
        self.images
            .iter()
            .map(|image| image.file.to_source_image())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/capture_tests.rs"]
mod tests;
