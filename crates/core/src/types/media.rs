//! Media classification for uploaded files.

use serde::{Deserialize, Serialize};

/// Kind of an uploaded media asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a declared content type.
    ///
    /// Returns `None` for anything that is neither `image/*` nor `video/*`.
    ///
    /// ```
    /// use atelier_core::MediaKind;
    ///
    /// assert_eq!(MediaKind::from_content_type("image/png"), Some(MediaKind::Image));
    /// assert_eq!(MediaKind::from_content_type("video/mp4"), Some(MediaKind::Video));
    /// assert_eq!(MediaKind::from_content_type("application/pdf"), None);
    /// ```
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.trim().to_ascii_lowercase();
        if content_type.starts_with("image/") {
            Some(Self::Image)
        } else if content_type.starts_with("video/") {
            Some(Self::Video)
        } else {
            None
        }
    }

    /// Folder segment used when filing assets of this kind.
    #[must_use]
    pub const fn folder(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
        }
    }

    /// Resource type segment in CDN API paths.
    #[must_use]
    pub const fn resource_type(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_type_ignores_case() {
        assert_eq!(
            MediaKind::from_content_type("Image/JPEG"),
            Some(MediaKind::Image)
        );
        assert_eq!(MediaKind::from_content_type(""), None);
        assert_eq!(MediaKind::from_content_type("text/image"), None);
    }

    #[test]
    fn test_folder_and_resource_type() {
        assert_eq!(MediaKind::Video.folder(), "videos");
        assert_eq!(MediaKind::Image.resource_type(), "image");
    }
}
