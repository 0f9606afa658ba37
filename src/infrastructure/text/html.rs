use scraper::{Html, Selector};
use std::borrow::Cow;
use std::io::Cursor;

use crate::domain::{text::strip_urls, DomainError};

/// Element whose content is extracted when the page has one.
pub const ARTICLE_SELECTOR: &str = "article#rsArticle";

// Wide enough that html2text never wraps a paragraph.
const UNWRAPPED_WIDTH: usize = 10_000;

/// Converts HTML to plain text and removes any URLs left in it.
///
/// Only `article#rsArticle` is rendered when the document contains it;
/// otherwise the whole document is. Rendering is undecorated: no emphasis
/// markers and no link footnotes.
pub fn html_to_text(html: &str) -> Result<String, DomainError> {
    let root = select_article(html)?;
    let text = html2text::config::plain_no_decorate()
        .link_footnotes(false)
        .string_from_read(Cursor::new(root.as_bytes()), UNWRAPPED_WIDTH)
        .map_err(|e| DomainError::parse(format!("html conversion failed: {e}")))?;
    Ok(strip_urls(&text))
}

fn select_article(html: &str) -> Result<Cow<'_, str>, DomainError> {
    let selector = Selector::parse(ARTICLE_SELECTOR)
        .map_err(|e| DomainError::parse(format!("invalid selector: {e}")))?;
    let document = Html::parse_document(html);

    let fragments: Vec<String> = document.select(&selector).map(|el| el.html()).collect();
    if fragments.is_empty() {
        Ok(Cow::Borrowed(html))
    } else {
        Ok(Cow::Owned(fragments.join("\n")))
    }
}
