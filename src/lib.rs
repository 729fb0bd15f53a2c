//! # Clinic Content
//!
//! The content layer behind a dental clinic's website. Pages (home, services,
//! technology, gallery, dental tourism, contact) are written and published in
//! a headless CMS; this crate reads them back and hands page code something it
//! can render.
//!
//! # Architecture: Two Reads
//!
//! ```text
//! LiveQuery   descriptor ──fetch──▶ dyn ContentClient ──▶ QueryState<T> (watch)
//! Images      ImageRef   ──build──▶ dyn AssetPipeline ──▶ URL string
//! ```
//!
//! Both collaborators are traits, constructed once at startup from
//! [`config::ContentConfig`] and passed in explicitly. Nothing here holds a
//! global client, so tests swap in mocks without any setup.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`live`] | `LiveQuery`: observable query state with stale-result suppression |
//! | [`query`] | Query descriptors and their structural identity |
//! | [`state`] | `QueryState`: Loading / Success / Failure |
//! | [`client`] | `ContentClient` trait and the HTTP implementation |
//! | [`imaging`] | Image references, asset pipeline, URL resolution |
//! | [`content`] | Typed clinic documents, their queries, service icons |
//! | [`config`] | Layered configuration: defaults, `config.toml`, environment |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Last-Issued-Wins
//!
//! A `LiveQuery` tags each fetch with a generation. Only the newest
//! generation may write state, whatever order responses arrive in. This is
//! stricter than "last-resolved-wins" and makes `A → B → A` behave: the first
//! `A`'s late answer is dropped even though it matches the current query.
//!
//! ## Errors Are State
//!
//! A failed fetch never panics or returns `Err` across the `LiveQuery`
//! boundary. It becomes `QueryState::Failure`, which page code renders as a
//! fallback. Retrying is the caller's call (`LiveQuery::refresh`).
//!
//! ## Read-Only
//!
//! The configuration has no credential field and the client has no mutation
//! method. A compromised page cannot write to the CMS through this crate.

pub mod client;
pub mod config;
pub mod content;
pub mod imaging;
pub mod live;
pub mod output;
pub mod query;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;
