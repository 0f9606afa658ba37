mod chat_model;
mod diagnostic_log;
mod loader;
mod page_fetcher;

pub use chat_model::{ChatModel, TokenStream};
pub use diagnostic_log::DiagnosticLog;
pub use loader::{LoadOutcome, Loader};
pub use page_fetcher::{FetchedPage, PageFetcher};
