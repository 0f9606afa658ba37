mod chat;
mod links;
mod web_loader;

pub use chat::ChatModelAdapter;
pub use links::discover_links;
pub use web_loader::{
    ChunkingOptions, LoaderSource, WebLoader, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
};
