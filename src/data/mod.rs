/// Data layer: core types, parsing, validation and export.
///
/// Architecture:
/// ```text
///  .ts text
///        │
///        ▼
///   ┌──────────┐
///   │  header   │  @key value lines → Metadata, stops at @data
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  grammar  │  Metadata → record grammar (delimiters, target policy)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   body    │  one record per line → Instance
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ validate  │  dataset-wide invariants
///   └──────────┘
///        │
///        ▼
///     Dataset  ──► writer / export / filter
/// ```

pub mod body;
pub mod error;
pub mod export;
pub mod filter;
pub mod grammar;
pub mod header;
pub mod loader;
pub mod model;
pub mod tokenizer;
pub mod validate;
pub mod writer;
