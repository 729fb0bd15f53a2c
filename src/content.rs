//! Typed clinic documents and the queries that select them.
//!
//! These mirror the projections in the query strings below, not the full CMS
//! schema (which lives with the CMS). Unknown fields in a response are
//! ignored, so the studio can grow fields without breaking the site.

use crate::imaging::ImageRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All published services, in display order.
pub const SERVICES_QUERY: &str = r#"*[_type == "service"] | order(order asc) {
  "id": _id, title, summary, icon, image
}"#;

/// A single service by slug. Takes `$slug`.
pub const SERVICE_BY_SLUG_QUERY: &str = r#"*[_type == "service" && slug.current == $slug][0] {
  "id": _id, title, summary, icon, image
}"#;

/// Gallery items, newest first.
pub const GALLERY_QUERY: &str = r#"*[_type == "galleryItem"] | order(_createdAt desc) {
  "id": _id, title, caption, image
}"#;

/// A treatment offered by the clinic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub icon: ServiceIcon,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// A photo in the clinic gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// Icon shown next to a service.
///
/// Editors pick a tag string in the CMS; each known tag maps to one variant.
/// Anything else, including a missing icon, lands on
/// [`ServiceIcon::Generic`] so the card still renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ServiceIcon {
    Implant,
    Crown,
    Whitening,
    Orthodontics,
    RootCanal,
    Cleaning,
    Surgery,
    Emergency,
    Technology,
    Travel,
    #[default]
    Generic,
}

impl ServiceIcon {
    /// Map a CMS tag to its variant. Case and separators are ignored.
    pub fn from_tag(tag: &str) -> Self {
        let normalized: String = tag
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "implant" | "implants" => ServiceIcon::Implant,
            "crown" | "crowns" | "bridge" | "bridges" => ServiceIcon::Crown,
            "whitening" | "sparkle" | "sparkles" => ServiceIcon::Whitening,
            "orthodontics" | "braces" | "aligners" => ServiceIcon::Orthodontics,
            "rootcanal" | "endodontics" => ServiceIcon::RootCanal,
            "cleaning" | "hygiene" => ServiceIcon::Cleaning,
            "surgery" | "extraction" => ServiceIcon::Surgery,
            "emergency" => ServiceIcon::Emergency,
            "technology" | "scanner" | "xray" => ServiceIcon::Technology,
            "travel" | "tourism" | "plane" => ServiceIcon::Travel,
            _ => ServiceIcon::Generic,
        }
    }

    /// Canonical tag, as written back by `Serialize`.
    pub fn tag(self) -> &'static str {
        match self {
            ServiceIcon::Implant => "implant",
            ServiceIcon::Crown => "crown",
            ServiceIcon::Whitening => "whitening",
            ServiceIcon::Orthodontics => "orthodontics",
            ServiceIcon::RootCanal => "root-canal",
            ServiceIcon::Cleaning => "cleaning",
            ServiceIcon::Surgery => "surgery",
            ServiceIcon::Emergency => "emergency",
            ServiceIcon::Technology => "technology",
            ServiceIcon::Travel => "travel",
            ServiceIcon::Generic => "generic",
        }
    }

    /// Name of the glyph in the site's icon set.
    pub fn glyph(self) -> &'static str {
        match self {
            ServiceIcon::Implant => "tooth-implant",
            ServiceIcon::Crown => "crown",
            ServiceIcon::Whitening => "sparkles",
            ServiceIcon::Orthodontics => "braces",
            ServiceIcon::RootCanal => "tooth-root",
            ServiceIcon::Cleaning => "toothbrush",
            ServiceIcon::Surgery => "scalpel",
            ServiceIcon::Emergency => "siren",
            ServiceIcon::Technology => "cpu",
            ServiceIcon::Travel => "plane",
            ServiceIcon::Generic => "tooth",
        }
    }
}

impl From<Option<String>> for ServiceIcon {
    fn from(tag: Option<String>) -> Self {
        tag.as_deref().map(ServiceIcon::from_tag).unwrap_or_default()
    }
}

impl From<ServiceIcon> for String {
    fn from(icon: ServiceIcon) -> Self {
        icon.tag().to_string()
    }
}

impl fmt::Display for ServiceIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
