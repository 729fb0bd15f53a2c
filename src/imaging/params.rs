//! Parameter types for image URL transforms.
//!
//! These structs describe *what* to ask the asset pipeline for, not how the
//! URL is spelled. [`ImageUrlBuilder`](super::pipeline::ImageUrlBuilder)
//! accumulates them; each [`AssetPipeline`](super::pipeline::AssetPipeline)
//! renders them in its own URL dialect.

/// Output format negotiation requested from the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Serve the best format the requesting browser accepts (AVIF, WebP, …).
    Format,
}

impl FormatMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FormatMode::Format => "format",
        }
    }
}

/// Transform parameters for a single image URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageParams {
    /// Target width in pixels. `None` keeps the original width.
    pub width: Option<u32>,
    pub auto: Option<FormatMode>,
}
