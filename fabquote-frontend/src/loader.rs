use std::path::{Path, PathBuf};

use fabquote_config::{AppConfig, PricingConfig, UnitPolicyKind};
use fabquote_core::{diagnostics::Warning, measurement::Measurement, path::PathModel};
use fabquote_engine::{
    builder::PathModelBuilder,
    measure::{DeclaredUnitPolicy, GeometryMeasurer, ThresholdUnitPolicy},
    pricing::{Quote, RateTable, Selection},
    session::{Completion, QuoteSession},
};
use fabquote_io::{DrawingLoader, DxfFacade};
use tracing::{info, warn};

use crate::errors::FrontendError;

/// 单个零件文件的处理结果。
#[derive(Debug)]
pub struct PartAnalysis {
    pub file: PathBuf,
    pub model: PathModel,
    pub measurement: Measurement,
    pub warnings: Vec<Warning>,
    pub completion: Completion,
}

/// 文件 → 实体 → 路径模型 → 测量，结果经 `QuoteSession` 防止旧文件覆盖新文件。
#[derive(Debug)]
pub struct QuotePipeline {
    loader: DxfFacade,
    builder: PathModelBuilder,
    measurer: GeometryMeasurer,
    session: QuoteSession,
}

impl QuotePipeline {
    pub fn from_config(config: &AppConfig) -> Self {
        let threshold = ThresholdUnitPolicy::new(config.measurement.inch_threshold);
        let measurer = match config.measurement.unit_policy {
            UnitPolicyKind::Threshold => GeometryMeasurer::with_unit_policy(threshold),
            UnitPolicyKind::Declared => {
                GeometryMeasurer::with_unit_policy(DeclaredUnitPolicy::new(threshold))
            }
        }
        .with_merge_tolerance(config.measurement.merge_tolerance);

        Self {
            loader: DxfFacade::new(),
            builder: PathModelBuilder::new(),
            measurer,
            session: QuoteSession::new(),
        }
    }

    pub fn analyze(&self, path: &Path) -> Result<PartAnalysis, FrontendError> {
        let ticket = self.session.begin(path.display().to_string());

        let drawing = self
            .loader
            .load(path)
            .map_err(|source| FrontendError::from_io(path.to_path_buf(), source))?;
        let mut warnings = drawing.warnings().to_vec();

        let report = self
            .builder
            .build_report(drawing.entities())
            .map_err(FrontendError::EmptyDrawing)?;
        warnings.extend(report.warnings);

        let measurement = self
            .measurer
            .measure_with_units(&report.model, drawing.declared_units());
        let completion = self.session.complete(&ticket, measurement);

        info!(
            path = %path.display(),
            entities = drawing.entities().len(),
            paths = report.model.len(),
            warnings = warnings.len(),
            width = measurement.width,
            height = measurement.height,
            holes = measurement.hole_count,
            "零件分析完成"
        );

        Ok(PartAnalysis {
            file: path.to_path_buf(),
            model: report.model,
            measurement,
            warnings,
            completion,
        })
    }

    pub fn quote(&self, rates: &RateTable, selection: &Selection) -> Quote {
        self.session.quote(Some(rates), selection)
    }

    #[inline]
    pub fn session(&self) -> &QuoteSession {
        &self.session
    }
}

/// 命令行指定的价格表优先，其次为配置中的路径，都没有时使用内置价目表。
pub fn load_rate_table(
    config: &PricingConfig,
    override_path: Option<&Path>,
) -> Result<RateTable, FrontendError> {
    match override_path.or(config.rate_table.as_deref()) {
        Some(path) => Ok(RateTable::load_checked(path, config.strict_rates)?),
        None => {
            let table = RateTable::default_schedule();
            for issue in table.audit() {
                warn!(key = %issue.key, problem = %issue.problem, "内置价目表配置问题");
            }
            Ok(table)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const RECTANGLE: &str = "0\nSECTION\n2\nENTITIES\n0\nLWPOLYLINE\n90\n4\n70\n1\n10\n0.0\n20\n0.0\n10\n10.0\n20\n0.0\n10\n10.0\n20\n5.0\n10\n0.0\n20\n5.0\n0\nENDSEC\n0\nEOF\n";

    #[test]
    fn analyze_then_quote() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.dxf");
        fs::write(&path, RECTANGLE).unwrap();

        let pipeline = QuotePipeline::from_config(&AppConfig::default());
        let analysis = pipeline.analyze(&path).unwrap();
        assert_eq!(analysis.completion, Completion::Accepted);
        assert!((analysis.measurement.area - 50.0).abs() < 1e-9);

        let quote = pipeline.quote(
            &RateTable::default_schedule(),
            &Selection::new("Mild Steel", "0.048\""),
        );
        assert_eq!(quote.total_cents(), 500);
    }

    #[test]
    fn garbage_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.dxf");
        fs::write(&path, "hello\nworld\n").unwrap();

        let pipeline = QuotePipeline::from_config(&AppConfig::default());
        let err = pipeline.analyze(&path).unwrap_err();
        assert!(matches!(err, FrontendError::UnreadableDrawing { .. }));
        assert!(pipeline.session().latest().is_none());
    }

    #[test]
    fn rate_table_falls_back_to_schedule() {
        let table = load_rate_table(&PricingConfig::default(), None).unwrap();
        assert_eq!(table, RateTable::default_schedule());
    }
}
