//! Asset pipeline trait and the CDN implementation.
//!
//! The [`AssetPipeline`] trait turns an [`ImageRef`] plus [`ImageParams`]
//! into a URL. Callers never build URLs by hand; they go through the
//! chainable [`ImageUrlBuilder`]:
//!
//! ```text
//! pipeline.image(&reference).auto(FormatMode::Format).width(1200).url()
//! ```
//!
//! The production implementation is [`CdnImagePipeline`], which renders
//! transform URLs for the image CDN:
//!
//! ```text
//! {cdn_host}/images/{project}/{dataset}/{id}-{W}x{H}.{fmt}?w=1200&auto=format
//! ```
//!
//! URL building is pure string work. Nothing here performs I/O.

use super::params::{FormatMode, ImageParams};
use super::reference::{AssetRef, ImageRef};
use crate::config::ContentConfig;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("malformed image reference: {0}")]
    MalformedReference(String),
}

/// Something that can render image transform URLs.
pub trait AssetPipeline: Send + Sync {
    /// Render the URL for `reference` with the given transforms.
    fn render(&self, reference: &ImageRef, params: &ImageParams) -> Result<String, ImageError>;
}

impl dyn AssetPipeline + '_ {
    /// Start building a URL for `reference`.
    pub fn image(&self, reference: &ImageRef) -> ImageUrlBuilder<'_> {
        ImageUrlBuilder {
            pipeline: self,
            reference: reference.clone(),
            params: ImageParams::default(),
        }
    }
}

/// Chainable URL builder returned by `image()` on a `dyn AssetPipeline`.
#[must_use]
pub struct ImageUrlBuilder<'a> {
    pipeline: &'a dyn AssetPipeline,
    reference: ImageRef,
    params: ImageParams,
}

impl ImageUrlBuilder<'_> {
    pub fn auto(mut self, mode: FormatMode) -> Self {
        self.params.auto = Some(mode);
        self
    }

    pub fn width(mut self, px: u32) -> Self {
        self.params.width = Some(px);
        self
    }

    pub fn params(&self) -> &ImageParams {
        &self.params
    }

    pub fn url(&self) -> Result<String, ImageError> {
        self.pipeline.render(&self.reference, &self.params)
    }
}

/// [`AssetPipeline`] for the hosted image CDN.
#[derive(Debug, Clone)]
pub struct CdnImagePipeline {
    base: String,
}

impl CdnImagePipeline {
    pub fn new(config: &ContentConfig) -> Self {
        Self {
            base: format!(
                "{}/images/{}/{}",
                config.images.cdn_host.trim_end_matches('/'),
                config.project_id,
                config.dataset
            ),
        }
    }
}

impl AssetPipeline for CdnImagePipeline {
    fn render(&self, reference: &ImageRef, params: &ImageParams) -> Result<String, ImageError> {
        let raw = reference.asset_ref();
        let asset =
            AssetRef::parse(raw).ok_or_else(|| ImageError::MalformedReference(raw.to_string()))?;

        let mut url = format!("{}/{}", self.base, asset.file_name());
        let mut query: Vec<String> = Vec::new();
        if let Some(width) = params.width {
            query.push(format!("w={width}"));
        }
        if let Some(mode) = params.auto {
            query.push(format!("auto={}", mode.as_str()));
        }
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        Ok(url)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock pipeline that records render calls and echoes their inputs.
    #[derive(Default)]
    pub struct MockPipeline {
        pub renders: Mutex<Vec<(String, ImageParams)>>,
    }

    impl MockPipeline {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn render_count(&self) -> usize {
            self.renders.lock().unwrap().len()
        }
    }

    impl AssetPipeline for MockPipeline {
        fn render(&self, reference: &ImageRef, params: &ImageParams) -> Result<String, ImageError> {
            self.renders
                .lock()
                .unwrap()
                .push((reference.asset_ref().to_string(), *params));
            if reference.asset_ref() == "broken" {
                return Err(ImageError::MalformedReference("broken".into()));
            }
            let width = params.width.map(|w| format!("?w={w}")).unwrap_or_default();
            Ok(format!("mock://{}{}", reference.asset_ref(), width))
        }
    }

    const REF: &str = "image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg";

    fn pipeline() -> CdnImagePipeline {
        CdnImagePipeline::new(&ContentConfig {
            project_id: "smile-clinic".into(),
            ..ContentConfig::default()
        })
    }

    #[test]
    fn cdn_url_with_width_and_auto() {
        let pipeline = pipeline();
        let url = (&pipeline as &dyn AssetPipeline)
            .image(&ImageRef::new(REF))
            .auto(FormatMode::Format)
            .width(1200)
            .url()
            .unwrap();
        assert_eq!(
            url,
            "https://cdn.sanity.io/images/smile-clinic/production/\
             Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg?w=1200&auto=format"
        );
    }

    #[test]
    fn cdn_url_without_transforms_has_no_query() {
        let pipeline = pipeline();
        let url = (&pipeline as &dyn AssetPipeline)
            .image(&ImageRef::new(REF))
            .url()
            .unwrap();
        assert!(url.ends_with("Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg"));
    }

    #[test]
    fn cdn_url_trims_host_slash() {
        let pipeline = CdnImagePipeline::new(&ContentConfig {
            project_id: "p".into(),
            dataset: "staging".into(),
            images: crate::config::ImagesConfig {
                cdn_host: "https://img.example.com/".into(),
            },
            ..ContentConfig::default()
        });
        let url = pipeline
            .render(&ImageRef::new("image-x-1x1-png"), &ImageParams::default())
            .unwrap();
        assert_eq!(url, "https://img.example.com/images/p/staging/x-1x1.png");
    }

    #[test]
    fn cdn_rejects_malformed_reference() {
        assert_eq!(
            pipeline().render(&ImageRef::new("file-abc-pdf"), &ImageParams::default()),
            Err(ImageError::MalformedReference("file-abc-pdf".into()))
        );
    }

    #[test]
    fn builder_accumulates_params() {
        let mock = MockPipeline::new();
        let dyn_pipeline: &dyn AssetPipeline = &mock;
        let builder = dyn_pipeline
            .image(&ImageRef::new(REF))
            .width(640)
            .auto(FormatMode::Format);
        assert_eq!(
            *builder.params(),
            ImageParams {
                width: Some(640),
                auto: Some(FormatMode::Format)
            }
        );
        assert_eq!(mock.render_count(), 0);
    }
}
