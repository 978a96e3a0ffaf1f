//! Title extraction from fetched HTML.
//!
//! ### Sanitization
//! - Documents are parsed with html5ever (via scraper); nothing is executed.
//! - Scriptable and style subtrees are detached before any text is read.
//!
//! ### Title lookup
//! - First `<title>` element, trimmed with inner whitespace collapsed.
//! - Otherwise the `content` of `meta[property="og:title"]`.

pub mod sanitize;
pub mod title;

pub use sanitize::{STRIPPED_SELECTORS, sanitize};
pub use title::extract_title;
