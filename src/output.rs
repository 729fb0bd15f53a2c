//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Query
//!
//! ```text
//! Query 3fa2c91b0d4e (2 params)
//! [
//!   {
//!     "id": "1",
//!     "title": "Implants"
//!   }
//! ]
//! ```
//!
//! ## Services
//!
//! ```text
//! 001 Implants [tooth-implant]
//!     Summary: Titanium implants placed in a single visit
//!     Image: https://cdn.sanity.io/images/…
//! 002 Whitening [sparkles]
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::config::ContentConfig;
use crate::content::{GalleryItem, Service};
use crate::query::QueryDescriptor;
use crate::state::QueryState;
use serde_json::Value;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

// ============================================================================
// Query
// ============================================================================

pub fn format_query_header(descriptor: &QueryDescriptor) -> String {
    match descriptor.params().len() {
        0 => format!("Query {}", descriptor.key()),
        1 => format!("Query {} (1 param)", descriptor.key()),
        n => format!("Query {} ({} params)", descriptor.key(), n),
    }
}

pub fn format_state(state: &QueryState<Value>) -> Vec<String> {
    match state {
        QueryState::Loading => vec!["Loading...".to_string()],
        QueryState::Success(data) => serde_json::to_string_pretty(data)
            .unwrap_or_else(|_| data.to_string())
            .lines()
            .map(str::to_string)
            .collect(),
        QueryState::Failure(error) => vec![format!("Error: {}", error)],
    }
}

pub fn print_query_output(descriptor: &QueryDescriptor, state: &QueryState<Value>) {
    println!("{}", format_query_header(descriptor));
    for line in format_state(state) {
        println!("{}", line);
    }
}

// ============================================================================
// Services and gallery
// ============================================================================

/// Format services with their glyphs. `image_url` resolves each service's image.
pub fn format_services(services: &[Service], image_url: impl Fn(&Service) -> String) -> Vec<String> {
    if services.is_empty() {
        return vec!["No services published".to_string()];
    }
    let mut lines = Vec::new();
    for (i, service) in services.iter().enumerate() {
        lines.push(format!(
            "{} {} [{}]",
            format_index(i + 1),
            service.title,
            service.icon.glyph()
        ));
        if let Some(summary) = service.summary.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("{}Summary: {}", indent(1), truncate(summary, 60)));
        }
        let url = image_url(service);
        if !url.is_empty() {
            lines.push(format!("{}Image: {}", indent(1), url));
        }
    }
    lines
}

pub fn print_services(services: &[Service], image_url: impl Fn(&Service) -> String) {
    for line in format_services(services, image_url) {
        println!("{}", line);
    }
}

/// Format gallery items. Items without a title show their id in parens.
pub fn format_gallery(items: &[GalleryItem], image_url: impl Fn(&GalleryItem) -> String) -> Vec<String> {
    if items.is_empty() {
        return vec!["Gallery is empty".to_string()];
    }
    let mut lines = Vec::new();
    for (i, item) in items.iter().enumerate() {
        match item.title.as_deref() {
            Some(t) if !t.is_empty() => lines.push(format!("{} {}", format_index(i + 1), t)),
            _ => lines.push(format!("{} ({})", format_index(i + 1), item.id)),
        }
        if let Some(caption) = item.caption.as_deref().filter(|c| !c.is_empty()) {
            lines.push(format!("{}Caption: {}", indent(1), truncate(caption, 60)));
        }
        let url = image_url(item);
        lines.push(format!(
            "{}Image: {}",
            indent(1),
            if url.is_empty() { "(none)" } else { url.as_str() }
        ));
    }
    lines
}

pub fn print_gallery(items: &[GalleryItem], image_url: impl Fn(&GalleryItem) -> String) {
    for line in format_gallery(items, image_url) {
        println!("{}", line);
    }
}

// ============================================================================
// Config
// ============================================================================

pub fn format_config(config: &ContentConfig) -> Vec<String> {
    let mut lines = vec![
        "Config".to_string(),
        format!("{}Project: {}", indent(1), config.project_id),
        format!("{}Dataset: {}", indent(1), config.dataset),
        format!("{}API version: {}", indent(1), config.api_version),
        format!(
            "{}Reads: {}",
            indent(1),
            if config.use_cdn { "CDN" } else { "live API" }
        ),
        format!("{}Endpoint: {}", indent(1), config.query_endpoint()),
        format!("{}Images: {}", indent(1), config.images.cdn_host),
    ];
    if let Some(secs) = config.request_timeout_secs {
        lines.push(format!("{}Timeout: {}s", indent(1), secs));
    }
    lines
}

pub fn print_config(config: &ContentConfig) {
    for line in format_config(config) {
        println!("{}", line);
    }
}
