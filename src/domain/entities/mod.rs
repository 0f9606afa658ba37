mod chunk;
mod conversation;

pub use chunk::{Chunk, ChunkMetadata, LoaderKind};
pub use conversation::{ChatMessage, ConversationEntry, MessageRole, Sender};
