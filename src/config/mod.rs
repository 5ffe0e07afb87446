pub mod toml_config;

pub use toml_config::{
    DynReader, PipelineConfig, ReaderConfig, SessionConfig, SourceConfig, TransformationConfig,
};
