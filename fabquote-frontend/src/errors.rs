use std::path::PathBuf;

use fabquote_engine::errors::{EngineError, RateTableError};
use fabquote_io::IoError;
use thiserror::Error;

/// 面向用户的错误。`Display` 不暴露解析器内部信息，细节通过 `source()` 链获取。
#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("file could not be read as a drawing")]
    UnreadableDrawing {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("file {path:?} could not be opened")]
    Open {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("drawing contains no cuttable geometry")]
    EmptyDrawing(#[source] EngineError),
    #[error("rate table could not be loaded")]
    Rates(#[from] RateTableError),
    #[error("failed to write {path:?}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("report could not be serialized")]
    Report(#[from] serde_json::Error),
}

impl FrontendError {
    pub(crate) fn from_io(path: PathBuf, source: IoError) -> Self {
        if source.is_format() {
            FrontendError::UnreadableDrawing { path, source }
        } else {
            FrontendError::Open { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn format_failures_hide_parser_details() {
        let err = FrontendError::from_io(
            PathBuf::from("part.dxf"),
            IoError::Format("第 3 行的组码无法解析".to_string()),
        );
        assert_eq!(err.to_string(), "file could not be read as a drawing");
        assert!(err.source().is_some());
    }
}
