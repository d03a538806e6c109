//! Types and traits for recording metrics of replay and episodes.
//!
//! * [`Record`] - A container of key-value pairs
//! * [`RecordValue`] - Values that can be stored in a [`Record`]
//! * [`Recorder`] - Destination of records
//! * [`BufferedRecorder`] - Keeps records in memory
//! * [`NullRecorder`] - Discards every record
//!
//! ```rust
//! use lcs_replay_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("buffer_size", 128.0);
//! record.insert("mode", RecordValue::String("explore".to_string()));
//! assert_eq!(record.get_scalar("buffer_size").unwrap(), 128.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
