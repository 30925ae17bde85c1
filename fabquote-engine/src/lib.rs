pub mod builder;
pub mod command;
pub mod measure;
pub mod pricing;
pub mod session;

pub mod errors {
    use std::path::PathBuf;

    use fabquote_core::path::PathId;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("drawing produced no cuttable paths")]
        EmptyModel,
    }

    /// 测量内部失败原因。对外的 `measure` 会把它降级为零测量。
    #[derive(Debug, Error, PartialEq)]
    pub enum MeasureError {
        #[error("path model is empty after simplification")]
        EmptyModel,
        #[error("path {0} has non-finite or negative parameters")]
        InvalidPath(PathId),
        #[error("measurement produced a non-finite {0}")]
        NonFinite(&'static str),
    }

    #[derive(Debug, Error)]
    pub enum RateTableError {
        #[error("failed to read rate table {path:?}: {source}")]
        Io {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error("failed to parse rate table as JSON: {0}")]
        Json(#[from] serde_json::Error),
        #[error("failed to parse rate table as TOML: {0}")]
        Toml(#[from] toml::de::Error),
        #[error("unsupported rate table format: {0:?}")]
        UnsupportedFormat(PathBuf),
        #[error("rate table has {} problem(s): {}", .0.len(), .0.join("; "))]
        Audit(Vec<String>),
    }
}
