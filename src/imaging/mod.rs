//! Image URL resolution.
//!
//! | Piece | Role |
//! |---|---|
//! | **Reference** | [`ImageRef`] as found in documents, [`AssetRef`] parsing |
//! | **Parameters** | [`ImageParams`], [`FormatMode`] |
//! | **Pipeline** | [`AssetPipeline`] trait + [`CdnImagePipeline`] |
//! | **Resolve** | [`resolve_image_url`] |
//!
//! Resolution is synchronous and uncached: each call is a fresh string build.

mod params;
pub mod pipeline;
mod reference;

pub use params::{FormatMode, ImageParams};
pub use pipeline::{AssetPipeline, CdnImagePipeline, ImageError, ImageUrlBuilder};
pub use reference::{AssetPointer, AssetRef, Dimensions, ImageRef};

use tracing::warn;

/// Resolve a ready-to-use URL for `reference`, optionally `width` pixels wide.
///
/// - Absent or blank reference → `""`, without touching the pipeline.
/// - Otherwise requests automatic format negotiation plus the width, if any.
/// - A reference the pipeline cannot read also yields `""`, logged at warn,
///   so a single bad document never breaks a page.
pub fn resolve_image_url(
    pipeline: &dyn AssetPipeline,
    reference: Option<&ImageRef>,
    width: Option<u32>,
) -> String {
    let Some(reference) = reference.filter(|r| !r.is_empty()) else {
        return String::new();
    };

    let mut builder = pipeline.image(reference).auto(FormatMode::Format);
    if let Some(width) = width {
        builder = builder.width(width);
    }
    match builder.url() {
        Ok(url) => url,
        Err(e) => {
            warn!(reference = reference.asset_ref(), error = %e, "Cannot resolve image URL");
            String::new()
        }
    }
}
