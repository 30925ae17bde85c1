use std::fmt::Write as _;

use fabquote_core::{diagnostics::Warning, measurement::Measurement};
use fabquote_engine::{
    command::{CommandBus, CommandContext, CommandRequest},
    pricing::{LineCategory, Quote},
};
use serde::Serialize;

use crate::loader::PartAnalysis;

/// 一次报价的完整输出，可打印为文本或序列化为 JSON。
#[derive(Debug, Clone, Serialize)]
pub struct QuoteReport {
    pub file: String,
    pub measurement: Measurement,
    pub quote: Quote,
    pub total_cents: i64,
    pub warnings: Vec<Warning>,
}

impl QuoteReport {
    pub fn new(analysis: &PartAnalysis, quote: Quote) -> Self {
        Self {
            file: analysis.file.display().to_string(),
            measurement: analysis.measurement,
            total_cents: quote.total_cents(),
            quote,
            warnings: analysis.warnings.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let m = &self.measurement;
        let mut out = String::new();
        let _ = writeln!(out, "Part: {}", self.file);
        let _ = writeln!(out, "  Size:        {:.3} in x {:.3} in", m.width, m.height);
        let _ = writeln!(out, "  Area:        {:.3} sq in", m.area);
        let _ = writeln!(out, "  Cut length:  {:.3} in", m.total_edge_length);
        let _ = writeln!(out, "  Holes:       {}", m.hole_count);

        if !self.quote.lines.is_empty() {
            let _ = writeln!(out, "Line items:");
            for line in &self.quote.lines {
                let category = match line.category {
                    LineCategory::Material => "material",
                    LineCategory::Finish => "finish",
                    LineCategory::Service => "service",
                };
                let _ = writeln!(
                    out,
                    "  - [{category}] {}: {:.3} x {:.4} = {:.2}",
                    line.label, line.quantity, line.rate, line.amount
                );
            }
        }
        let _ = writeln!(
            out,
            "Unit price: {:.2}  Quantity: {}  Total: {:.2}",
            self.quote.unit_price, self.quote.quantity, self.quote.total_price
        );

        if !self.warnings.is_empty() {
            let _ = writeln!(out, "Warnings:");
            for warning in &self.warnings {
                let _ = writeln!(out, "  - {warning}");
            }
        }
        out
    }
}

pub(crate) fn dispatch_cli_command(
    bus: &CommandBus,
    request: &CommandRequest,
    context: &CommandContext<'_>,
) -> Result<String, String> {
    let response = bus.dispatch(request, context);
    if response.success {
        Ok(response.message.unwrap_or_default())
    } else {
        Err(response.message.unwrap_or_else(|| "未知错误".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use fabquote_core::path::PathModel;
    use fabquote_engine::pricing::{RateTable, Selection, price};
    use fabquote_engine::session::Completion;

    use super::*;

    fn analysis() -> PartAnalysis {
        PartAnalysis {
            file: PathBuf::from("plate.dxf"),
            model: PathModel::new(),
            measurement: Measurement {
                width: 10.0,
                height: 5.0,
                area: 50.0,
                total_edge_length: 30.0,
                hole_count: 4,
            },
            warnings: vec![Warning::new(
                fabquote_core::diagnostics::WarningKind::UnsupportedEntity,
                "暂不支持的实体类型 TEXT",
            )],
            completion: Completion::Accepted,
        }
    }

    #[test]
    fn text_report_lists_items_and_total() {
        let analysis = analysis();
        let selection = Selection::new("Mild Steel", "0.048\"").with_service("Countersinking");
        let quote = price(
            Some(&analysis.measurement),
            Some(&RateTable::default_schedule()),
            &selection,
        );
        let text = QuoteReport::new(&analysis, quote).render_text();
        assert!(text.contains("Holes:       4"));
        assert!(text.contains("[service] Countersinking"));
        assert!(text.contains("Total: 7.00"));
        assert!(text.contains("[unsupported_entity]"));
    }

    #[test]
    fn json_report_carries_cents() {
        let analysis = analysis();
        let quote = price(
            Some(&analysis.measurement),
            Some(&RateTable::default_schedule()),
            &Selection::new("Mild Steel", "0.048\"").with_quantity(3),
        );
        let json: serde_json::Value =
            serde_json::from_str(&QuoteReport::new(&analysis, quote).to_json().unwrap()).unwrap();
        assert_eq!(json["total_cents"], 1500);
        assert_eq!(json["quote"]["quantity"], 3);
        assert_eq!(json["warnings"][0]["kind"], "unsupported_entity");
    }
}
