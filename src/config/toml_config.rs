use crate::adapters::session::Session;
use crate::adapters::sources::{ApiSource, CsvSource, JsonSource, TableSource};
use crate::core::reader::Reader;
use crate::core::transform::OPERATIONS;
use crate::domain::model::Arguments;
use crate::domain::ports::Source;
use crate::utils::error::{ReaderError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_unique,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Reader over any backend a [`Session`] can drive.
pub type DynReader = Reader<Box<dyn Source<Client = Session>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub readers: Vec<ReaderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_base_path")]
    pub base_path: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            timeout_seconds: None,
        }
    }
}

fn default_base_path() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    pub id: String,
    pub source: SourceConfig,
    #[serde(default)]
    pub transformations: Vec<TransformationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Csv {
        path: String,
        delimiter: Option<String>,
        has_headers: Option<bool>,
    },
    Json {
        path: String,
    },
    Api {
        endpoint: String,
        headers: Option<BTreeMap<String, String>>,
    },
    Table {
        table: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationConfig {
    pub op: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, Value>,
}

fn delimiter_byte(field: &str, delimiter: &str) -> Result<u8> {
    match delimiter.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(ReaderError::InvalidConfigValueError {
            field: field.to_string(),
            value: delimiter.to_string(),
            reason: "Delimiter must be a single ASCII character".to_string(),
        }),
    }
}

impl PipelineConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReaderError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReaderError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn session(&self) -> Result<Session> {
        let timeout = self
            .session
            .timeout_seconds
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        Session::with_timeout(&self.session.base_path, Duration::from_secs(timeout))
    }

    /// 依宣告順序組裝 readers
    pub fn readers(&self) -> Result<Vec<DynReader>> {
        self.validate()?;
        self.readers.iter().map(ReaderConfig::to_reader).collect()
    }

    /// Builds every reader in declaration order, stopping at the first failure.
    pub fn build_all(&self, session: &Session) -> Result<()> {
        let readers = self.readers()?;
        tracing::info!("Building {} readers", readers.len());

        for reader in &readers {
            reader.build(session)?;
        }
        Ok(())
    }
}

impl ReaderConfig {
    pub fn to_reader(&self) -> Result<DynReader> {
        let source: Box<dyn Source<Client = Session>> = match &self.source {
            SourceConfig::Csv {
                path,
                delimiter,
                has_headers,
            } => {
                let mut csv = CsvSource::new(path).has_headers(has_headers.unwrap_or(true));
                if let Some(delimiter) = delimiter {
                    csv = csv.delimiter(delimiter_byte("source.delimiter", delimiter)?);
                }
                Box::new(csv)
            }
            SourceConfig::Json { path } => Box::new(JsonSource::new(path)),
            SourceConfig::Api { endpoint, headers } => {
                let mut api = ApiSource::new(endpoint);
                for (name, value) in headers.iter().flatten() {
                    api = api.header(name, value);
                }
                Box::new(api)
            }
            SourceConfig::Table { table } => Box::new(TableSource::new(table)),
        };

        let mut reader = Reader::new(&self.id, source);
        for step in &self.transformations {
            reader.with_operation(
                &step.op,
                Arguments {
                    args: step.args.clone(),
                    kwargs: step.kwargs.clone(),
                },
            );
        }
        Ok(reader)
    }
}

impl Validate for SourceConfig {
    fn validate(&self) -> Result<()> {
        match self {
            SourceConfig::Csv {
                path, delimiter, ..
            } => {
                validate_path("source.path", path)?;
                if let Some(delimiter) = delimiter {
                    delimiter_byte("source.delimiter", delimiter)?;
                }
                Ok(())
            }
            SourceConfig::Json { path } => validate_path("source.path", path),
            SourceConfig::Api { endpoint, .. } => validate_url("source.endpoint", endpoint),
            SourceConfig::Table { table } => validate_non_empty_string("source.table", table),
        }
    }
}

impl Validate for PipelineConfig {
    fn validate(&self) -> Result<()> {
        validate_path("session.base_path", &self.session.base_path)?;
        if let Some(timeout) = self.session.timeout_seconds {
            validate_positive_number("session.timeout_seconds", timeout, 1)?;
        }

        for reader in &self.readers {
            validate_non_empty_string("readers.id", &reader.id)?;
            reader.source.validate()?;

            for step in &reader.transformations {
                if !OPERATIONS.contains(&step.op.as_str()) {
                    return Err(ReaderError::InvalidConfigValueError {
                        field: "readers.transformations.op".to_string(),
                        value: step.op.clone(),
                        reason: format!("Unknown operation. Valid operations: {}", OPERATIONS.join(", ")),
                    });
                }
            }
        }

        validate_unique("readers.id", self.readers.iter().map(|r| r.id.as_str()))
    }
}
