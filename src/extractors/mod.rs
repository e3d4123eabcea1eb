// Ark Index Language Extractors Module
//
// Regex-driven baseline extractors for the four symbol languages, the shared
// symbol model, and the adapter dispatch that lets a proper parser pre-empt
// the baseline per file.

pub mod base;
pub mod manager;

pub mod go;
pub mod python;
pub mod rust;
pub mod typescript;

// Re-export the symbol model
pub use base::{
    Position, Span, Symbol, SymbolDraft, SymbolIdAllocator, SymbolKind, Visibility,
};
pub use manager::{ExtractionOutcome, ExtractorManager, SymbolAdapter};
