use std::collections::HashMap;
use std::fmt::Write as _;

use crate::pricing::{Catalog, RateTable, Selection};
use crate::session::QuoteSession;

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(&self, request: &CommandRequest, context: &CommandContext<'_>) -> CommandResponse;
}

pub struct CommandContext<'a> {
    pub session: &'a QuoteSession,
    pub rates: Option<&'a RateTable>,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register(CatalogCommand);
        bus.register(MeasurementCommand);
        bus.register(QuoteCommand);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(&self, request: &CommandRequest, context: &CommandContext<'_>) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("未知命令: {}", request.name))
        }
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

struct CatalogCommand;

impl CommandHandler for CatalogCommand {
    fn name(&self) -> &'static str {
        "catalog"
    }

    fn execute(&self, _request: &CommandRequest, context: &CommandContext<'_>) -> CommandResponse {
        let Some(rates) = context.rates else {
            return CommandResponse::err("未加载价格表");
        };
        let catalog = Catalog::from_rates(rates);
        let mut out = String::new();
        for material in &catalog.materials {
            let gauges: Vec<&str> = material
                .thicknesses
                .iter()
                .map(|option| option.label.as_str())
                .collect();
            let _ = writeln!(out, "{}: {}", material.label, gauges.join(", "));
        }
        for option in catalog.finishes.iter().chain(&catalog.services) {
            let _ = writeln!(out, "{} ({:.2} per {})", option.label, option.rate, option.unit);
        }
        CommandResponse::ok(out.trim_end())
    }
}

struct MeasurementCommand;

impl CommandHandler for MeasurementCommand {
    fn name(&self) -> &'static str {
        "measurement"
    }

    fn execute(&self, _request: &CommandRequest, context: &CommandContext<'_>) -> CommandResponse {
        match context.session.latest() {
            Some((file, m)) => CommandResponse::ok(format!(
                "{file}: {:.3} x {:.3} in, area {:.3} in², edges {:.3} in, holes {}",
                m.width, m.height, m.area, m.total_edge_length, m.hole_count
            )),
            None => CommandResponse::err("当前没有可用的测量结果"),
        }
    }
}

/// 参数形如 `material=Mild Steel`、`service=Deburring`（可重复）、`quantity=3`。
struct QuoteCommand;

impl QuoteCommand {
    fn selection(args: &[String]) -> Result<Selection, String> {
        let mut selection = Selection::default();
        for arg in args {
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| format!("参数 {arg} 缺少 '='"))?;
            let value = value.trim().to_string();
            match key.trim() {
                "material" => selection.material = Some(value),
                "thickness" => selection.thickness = Some(value),
                "finish" => selection.finish = Some(value),
                "service" => {
                    selection.services.insert(value);
                }
                "quantity" => {
                    selection.quantity = value
                        .parse()
                        .map_err(|_| format!("数量 {value} 不是正整数"))?;
                }
                other => return Err(format!("未知参数 {other}")),
            }
        }
        Ok(selection)
    }
}

impl CommandHandler for QuoteCommand {
    fn name(&self) -> &'static str {
        "quote"
    }

    fn execute(&self, request: &CommandRequest, context: &CommandContext<'_>) -> CommandResponse {
        let selection = match Self::selection(&request.args) {
            Ok(selection) => selection,
            Err(message) => return CommandResponse::err(message),
        };
        let quote = context.session.quote(context.rates, &selection);
        CommandResponse::ok(format!(
            "unit {:.2} x {} = {:.2}",
            quote.unit_price, quote.quantity, quote.total_price
        ))
    }
}

#[cfg(test)]
mod tests {
    use fabquote_core::measurement::Measurement;

    use super::*;

    #[test]
    fn quote_and_measurement_commands_work() {
        let session = QuoteSession::new();
        let ticket = session.begin("plate.dxf");
        session.complete(
            &ticket,
            Measurement {
                width: 10.0,
                height: 5.0,
                area: 50.0,
                total_edge_length: 30.0,
                hole_count: 4,
            },
        );
        let rates = RateTable::default_schedule();
        let bus = CommandBus::new();
        let context = CommandContext {
            session: &session,
            rates: Some(&rates),
        };

        let response = bus.dispatch(&CommandRequest::new("measurement", Vec::<String>::new()), &context);
        assert!(response.success);
        assert!(response.message.unwrap().starts_with("plate.dxf"));

        let quote = CommandRequest::new(
            "quote",
            [
                "material=Mild Steel",
                "thickness=0.048\"",
                "service=Countersinking",
                "quantity=2",
            ],
        );
        let response = bus.dispatch(&quote, &context);
        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("unit 7.00 x 2 = 14.00"));
    }

    #[test]
    fn catalog_requires_rates_and_unknown_commands_fail() {
        let session = QuoteSession::new();
        let bus = CommandBus::new();
        let without_rates = CommandContext {
            session: &session,
            rates: None,
        };
        assert!(!bus.dispatch(&CommandRequest::new("catalog", Vec::<String>::new()), &without_rates).success);
        assert!(!bus.dispatch(&CommandRequest::new("explode", Vec::<String>::new()), &without_rates).success);

        let rates = RateTable::default_schedule();
        let context = CommandContext {
            session: &session,
            rates: Some(&rates),
        };
        let response = bus.dispatch(&CommandRequest::new("catalog", Vec::<String>::new()), &context);
        assert!(response.success);
        let text = response.message.unwrap();
        assert!(text.contains("Mild Steel: 0.030\""));
        assert!(text.contains("Countersinking (0.50 per hole)"));

        let bad = CommandRequest::new("quote", ["quantity=many"]);
        assert!(!bus.dispatch(&bad, &context).success);
        assert_eq!(bus.available_commands().count(), 3);
    }
}
