pub mod reader;
pub mod transform;

pub use crate::domain::model::{Arguments, DataFrame};
pub use crate::domain::ports::{Catalog, Client, Source, Transformable};
pub use crate::utils::error::Result;
