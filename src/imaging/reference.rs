//! Image references as they appear in CMS documents.
//!
//! Documents point at images in one of two shapes, both accepted by
//! [`ImageRef`]'s deserializer:
//!
//! ```text
//! "image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg"                  bare reference
//! {"_type": "image", "asset": {"_ref": "image-Tb9E…-2000x3000-jpg"}} image field
//! ```
//!
//! The reference string itself follows the asset naming convention
//! `image-<assetId>-<width>x<height>-<format>`, parsed by [`AssetRef::parse`].
//! Outside the pipeline the reference stays opaque.

use serde::{Deserialize, Serialize};

/// Pixel dimensions of an original asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Pointer to an uploaded asset inside an image field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPointer {
    #[serde(rename = "_ref", alias = "_id")]
    pub reference: String,
}

/// Opaque handle to a remote image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Ref(String),
    Image { asset: AssetPointer },
}

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        ImageRef::Ref(reference.into())
    }

    /// The underlying asset reference string.
    pub fn asset_ref(&self) -> &str {
        match self {
            ImageRef::Ref(r) => r,
            ImageRef::Image { asset } => &asset.reference,
        }
    }

    /// An empty reference counts as no image at all.
    pub fn is_empty(&self) -> bool {
        self.asset_ref().trim().is_empty()
    }
}

/// Parsed `image-<id>-<W>x<H>-<format>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef<'a> {
    pub id: &'a str,
    pub dimensions: Dimensions,
    pub format: &'a str,
}

impl<'a> AssetRef<'a> {
    /// Parse an asset reference, returning `None` if it does not follow the
    /// naming convention.
    ///
    /// Handles these patterns:
    /// - `"image-abc123-2000x3000-jpg"` → id="abc123", 2000x3000, format="jpg"
    /// - `"image-a-b-c-640x480-png"` → id="a-b-c" (split from the right)
    /// - `"file-abc123-pdf"` → `None` (not an image)
    /// - `"image-abc123-2000-jpg"` → `None` (no `WxH`)
    pub fn parse(reference: &'a str) -> Option<Self> {
        let rest = reference.strip_prefix("image-")?;
        let (rest, format) = rest.rsplit_once('-')?;
        let (id, dims) = rest.rsplit_once('-')?;
        let (w, h) = dims.split_once('x')?;
        let width = w.parse().ok()?;
        let height = h.parse().ok()?;
        if id.is_empty() || format.is_empty() {
            return None;
        }
        Some(Self {
            id,
            dimensions: Dimensions { width, height },
            format,
        })
    }

    /// File name of the original on the CDN: `<id>-<W>x<H>.<format>`.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}x{}.{}",
            self.id, self.dimensions.width, self.dimensions.height, self.format
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const REF: &str = "image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg";

    #[test]
    fn parse_standard_reference() {
        let asset = AssetRef::parse(REF).unwrap();
        assert_eq!(asset.id, "Tb9Ew8CXIwaY6R1kjMvI0uRR");
        assert_eq!(
            asset.dimensions,
            Dimensions {
                width: 2000,
                height: 3000
            }
        );
        assert_eq!(asset.format, "jpg");
        assert_eq!(asset.file_name(), "Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg");
    }

    #[test]
    fn parse_id_with_dashes() {
        let asset = AssetRef::parse("image-a-b-c-640x480-png").unwrap();
        assert_eq!(asset.id, "a-b-c");
        assert_eq!(asset.format, "png");
    }

    #[test]
    fn parse_rejects_non_image() {
        assert_eq!(AssetRef::parse("file-abc123-pdf"), None);
    }

    #[test]
    fn parse_rejects_missing_dimensions() {
        assert_eq!(AssetRef::parse("image-abc123-2000-jpg"), None);
        assert_eq!(AssetRef::parse("image-abc123-wxh-jpg"), None);
        assert_eq!(AssetRef::parse("image-"), None);
    }

    #[test]
    fn deserialize_bare_string() {
        let r: ImageRef = serde_json::from_value(json!(REF)).unwrap();
        assert_eq!(r, ImageRef::new(REF));
    }

    #[test]
    fn deserialize_image_field_with_extras() {
        let r: ImageRef = serde_json::from_value(json!({
            "_type": "image",
            "asset": {"_ref": REF, "_type": "reference"},
            "hotspot": {"x": 0.5, "y": 0.5}
        }))
        .unwrap();
        assert_eq!(r.asset_ref(), REF);
    }

    #[test]
    fn deserialize_expanded_asset_by_id() {
        let r: ImageRef = serde_json::from_value(json!({"asset": {"_id": REF}})).unwrap();
        assert_eq!(r.asset_ref(), REF);
    }

    #[test]
    fn blank_reference_is_empty() {
        assert!(ImageRef::new("  ").is_empty());
        assert!(!ImageRef::new(REF).is_empty());
    }
}
