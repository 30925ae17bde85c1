use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "FABQUOTE_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub measurement: MeasurementConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。价格表的相对路径按配置文件所在目录解析。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let (Some(table), Some(base)) = (config.pricing.rate_table.as_mut(), path.parent()) {
            if table.is_relative() {
                *table = base.join(&*table);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// 自动发现配置文件：优先读取环境变量 `FABQUOTE_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (
                "measurement.inch_threshold",
                self.measurement.inch_threshold.is_finite() && self.measurement.inch_threshold > 0.0,
            ),
            (
                "measurement.merge_tolerance",
                self.measurement.merge_tolerance.is_finite()
                    && self.measurement.merge_tolerance >= 0.0,
            ),
            (
                "preview.accuracy",
                self.preview.accuracy.is_finite() && self.preview.accuracy > 0.0,
            ),
            (
                "preview.padding_ratio",
                self.preview.padding_ratio.is_finite() && self.preview.padding_ratio >= 0.0,
            ),
        ];
        match checks.iter().find(|(_, ok)| !ok) {
            Some((field, _)) => Err(ConfigError::Invalid { field: *field }),
            None => Ok(()),
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitPolicyKind {
    #[default]
    Threshold,
    Declared,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasurementConfig {
    #[serde(default = "MeasurementConfig::default_inch_threshold")]
    pub inch_threshold: f64,
    #[serde(default = "MeasurementConfig::default_merge_tolerance")]
    pub merge_tolerance: f64,
    #[serde(default)]
    pub unit_policy: UnitPolicyKind,
}

impl MeasurementConfig {
    fn default_inch_threshold() -> f64 {
        20.0
    }

    fn default_merge_tolerance() -> f64 {
        0.001
    }
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            inch_threshold: Self::default_inch_threshold(),
            merge_tolerance: Self::default_merge_tolerance(),
            unit_policy: UnitPolicyKind::default(),
        }
    }
}

/// 价格表来源。未配置路径时使用内置价目表。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub rate_table: Option<PathBuf>,
    #[serde(default)]
    pub strict_rates: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "PreviewConfig::default_accuracy")]
    pub accuracy: f64,
    #[serde(default = "PreviewConfig::default_padding_ratio")]
    pub padding_ratio: f64,
}

impl PreviewConfig {
    fn default_accuracy() -> f64 {
        0.1
    }

    fn default_padding_ratio() -> f64 {
        0.1
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            accuracy: Self::default_accuracy(),
            padding_ratio: Self::default_padding_ratio(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配置项 {field} 的取值无效")]
    Invalid { field: &'static str },
}
