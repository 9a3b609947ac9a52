pub mod compare;
pub mod config;
pub mod db;
pub mod error;
pub mod parser;
pub mod source;

pub use config::Settings;
pub use error::{ExtractError, ProcessError, StoreError};
pub use parser::{Pipeline, ProcessReport};
pub use source::{DocumentSource, ExtractionResult, TextSource};
