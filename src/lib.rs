pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::catalog::{MemoryCatalog, View};
pub use adapters::session::Session;
pub use adapters::sources::{ApiSource, CsvSource, JsonSource, MemorySource, TableSource};
pub use config::{DynReader, PipelineConfig};
pub use crate::core::reader::{DatasetOf, Reader, Transformation, Transformer};
pub use domain::model::{Arguments, DataFrame};
pub use domain::ports::{Catalog, Client, Source, Transformable};
pub use utils::error::{ReaderError, Result};
