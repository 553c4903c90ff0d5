//! Loader, validator and converter for `.ts` time-series datasets.
//!
//! ```no_run
//! let text = std::fs::read_to_string("Gunpoint_TRAIN.ts")?;
//! let dataset = rusty_ts::load(&text)?;
//! println!("{} instances", dataset.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod data;

pub use data::error::{LoadError, LoadErrorKind};
pub use data::loader::{load, load_file, load_split, Split, SplitRequest};
pub use data::model::{Channel, Dataset, Instance, Metadata, Target, TargetKind};
pub use data::writer::write_ts;
