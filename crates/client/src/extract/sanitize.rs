//! Removal of scriptable and style subtrees from a parsed document.

use scraper::{Html, Selector};

/// Subtrees detached before a document's text is read.
pub const STRIPPED_SELECTORS: &[&str] = &[
    "script",
    "noscript",
    "style",
    "template",
    "iframe",
    "object",
    "embed",
    "svg",
    r#"link[rel~="stylesheet"]"#,
];

/// Detach every subtree matching [`STRIPPED_SELECTORS`].
///
/// Returns the number of subtrees removed.
pub fn sanitize(document: &mut Html) -> usize {
    let mut doomed = Vec::new();
    for css in STRIPPED_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            tracing::warn!(selector = css, "skipping unparsable selector");
            continue;
        };
        doomed.extend(document.select(&selector).map(|el| el.id()));
    }

    let mut removed = 0;
    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
            removed += 1;
        }
    }
    removed
}
