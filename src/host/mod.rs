//! Capabilities the studio borrows from its host: durable key/value
//! storage, printing, and speech input.

pub mod printer;
pub mod speech;
pub mod storage;

pub use printer::{CommandPrinter, FilePrinter, Printer};
pub use speech::{LineDictation, SpeechInput};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
