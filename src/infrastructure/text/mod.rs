mod html;
mod splitter;

pub use html::{html_to_text, ARTICLE_SELECTOR};
pub use splitter::TextChunker;
