//! `<title>` / `og:title` lookup.

use scraper::{Html, Selector};

use super::sanitize::sanitize;

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_match<'a>(document: &'a Html, css: &str) -> Option<scraper::ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn title_element(document: &Html) -> Option<String> {
    let title = first_match(document, "title")?;
    let text = collapse_whitespace(&title.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

fn og_title(document: &Html) -> Option<String> {
    let meta = first_match(document, r#"meta[property="og:title"]"#)?;
    let text = collapse_whitespace(meta.value().attr("content")?);
    (!text.is_empty()).then_some(text)
}

/// Extract a display title from an HTML document.
///
/// Returns `None` when neither the title element nor `og:title` has text.
pub fn extract_title(html: &str) -> Option<String> {
    let mut document = Html::parse_document(html);
    sanitize(&mut document);
    title_element(&document).or_else(|| og_title(&document))
}
