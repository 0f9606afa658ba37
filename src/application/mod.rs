//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than concrete
//! implementations: the loader on a `PageFetcher`, the chat adapter on a
//! `ChatModel`, both on an injected `DiagnosticLog`.

pub mod services;

pub use services::{ChatModelAdapter, ChunkingOptions, LoaderSource, WebLoader};
