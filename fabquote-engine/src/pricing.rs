use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

use fabquote_core::measurement::Measurement;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::errors::RateTableError;

/// 单价。反序列化时接受数字或数字字符串，其他内容按 0 处理。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Rate(f64);

impl Rate {
    #[inline]
    pub fn new(value: f64) -> Self {
        Self(if value.is_finite() { value } else { 0.0 })
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawRate {
            Number(f64),
            Text(String),
            Other(serde::de::IgnoredAny),
        }

        let value = match RawRate::deserialize(deserializer)? {
            RawRate::Number(value) => value,
            RawRate::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
            RawRate::Other(_) => 0.0,
        };
        Ok(Rate::new(value))
    }
}

/// 嵌套价格表：材料 → 厚度 → 每平方英寸单价；表面处理与附加服务按键取价。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(default)]
    pub materials: BTreeMap<String, BTreeMap<String, Rate>>,
    #[serde(default)]
    pub finishes: BTreeMap<String, Rate>,
    #[serde(default)]
    pub services: BTreeMap<String, Rate>,
}

impl RateTable {
    pub fn from_json_str(raw: &str) -> Result<Self, RateTableError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, RateTableError> {
        Ok(toml::from_str(raw)?)
    }

    /// 按扩展名读取 JSON 或 TOML 价格表。
    pub fn load(path: &Path) -> Result<Self, RateTableError> {
        let raw = fs::read_to_string(path).map_err(|source| RateTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let table = match extension.as_deref() {
            Some("json") => Self::from_json_str(&raw)?,
            Some("toml") => Self::from_toml_str(&raw)?,
            _ => return Err(RateTableError::UnsupportedFormat(path.to_path_buf())),
        };
        debug!(
            path = %path.display(),
            materials = table.materials.len(),
            finishes = table.finishes.len(),
            services = table.services.len(),
            "价格表已加载"
        );
        Ok(table)
    }

    /// 加载后审计；`strict` 时任何问题都视为错误，否则仅记录警告。
    pub fn load_checked(path: &Path, strict: bool) -> Result<Self, RateTableError> {
        let table = Self::load(path)?;
        let issues = table.audit();
        if issues.is_empty() {
            return Ok(table);
        }
        if strict {
            return Err(RateTableError::Audit(
                issues.iter().map(ToString::to_string).collect(),
            ));
        }
        for issue in &issues {
            warn!(path = %path.display(), key = %issue.key, problem = %issue.problem, "价格表配置问题");
        }
        Ok(table)
    }

    pub fn material_rate(&self, material_key: &str, thickness_key: &str) -> f64 {
        self.materials
            .get(material_key)
            .and_then(|thicknesses| thicknesses.get(thickness_key))
            .map_or(0.0, |rate| rate.value())
    }

    pub fn finish_rate(&self, key: &str) -> f64 {
        self.finishes.get(key).map_or(0.0, |rate| rate.value())
    }

    pub fn service_rate(&self, key: &str) -> f64 {
        self.services.get(key).map_or(0.0, |rate| rate.value())
    }

    /// 找出报价时会静默计为 0 的配置。
    pub fn audit(&self) -> Vec<RateIssue> {
        let mut issues = Vec::new();

        for (material, thicknesses) in &self.materials {
            for (thickness, rate) in thicknesses {
                let key = format!("{material}.{thickness}");
                if rate_key::thickness_value(thickness).is_none() {
                    issues.push(RateIssue::new(&key, RateProblem::NonNumericThickness));
                }
                if rate.value() < 0.0 {
                    issues.push(RateIssue::new(&key, RateProblem::NegativeRate));
                }
            }
        }

        for (key, rate) in &self.finishes {
            if !key.ends_with(rate_key::FINISH_SUFFIX) {
                issues.push(RateIssue::new(key, RateProblem::FinishNotPerSquareInch));
            }
            if rate.value() < 0.0 {
                issues.push(RateIssue::new(key, RateProblem::NegativeRate));
            }
        }

        for (key, rate) in &self.services {
            if ServiceRule::from_rate_key(key).is_none() {
                issues.push(RateIssue::new(key, RateProblem::NoServiceRule));
            }
            if rate.value() < 0.0 {
                issues.push(RateIssue::new(key, RateProblem::NegativeRate));
            }
        }

        issues
    }

    /// 内置价目表：各材料常用规格统一 0.10/in²。
    pub fn default_schedule() -> Self {
        const ALUMINUM_5052: &[&str] = &["0_040", "0_063", "0_080", "0_090", "0_100"];
        const ALUMINUM_6061: &[&str] = &[
            "0_040", "0_063", "0_080", "0_090", "0_100", "0_125", "0_190", "0_250",
        ];
        const MILD_STEEL: &[&str] = &[
            "0_030", "0_048", "0_059", "0_074", "0_104", "0_119", "0_135", "0_187", "0_250",
            "0_313", "0_375", "0_500",
        ];
        const STAINLESS: &[&str] = &[
            "0_030", "0_048", "0_063", "0_074", "0_090", "0_120", "0_135", "0_187",
        ];
        const SHEET_RATE: f64 = 0.10;

        let gauges = |keys: &[&str]| -> BTreeMap<String, Rate> {
            keys.iter()
                .map(|key| ((*key).to_string(), Rate::new(SHEET_RATE)))
                .collect()
        };

        let mut materials = BTreeMap::new();
        materials.insert("5052_H32_Aluminum".to_string(), gauges(ALUMINUM_5052));
        materials.insert("6061_T6_Aluminum".to_string(), gauges(ALUMINUM_6061));
        materials.insert("Mild_Steel".to_string(), gauges(MILD_STEEL));
        materials.insert("Stainless_Steel_304".to_string(), gauges(STAINLESS));
        materials.insert("Stainless_Steel_316".to_string(), gauges(STAINLESS));

        let finishes = BTreeMap::from([("powder_coat_per_sq_inch".to_string(), Rate::new(0.05))]);
        let services = BTreeMap::from([
            ("countersinking_per_hole".to_string(), Rate::new(0.50)),
            ("deburring_per_inch".to_string(), Rate::new(0.10)),
        ]);

        Self {
            materials,
            finishes,
            services,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateIssue {
    pub key: String,
    pub problem: RateProblem,
}

impl RateIssue {
    fn new(key: &str, problem: RateProblem) -> Self {
        Self {
            key: key.to_string(),
            problem,
        }
    }
}

impl fmt::Display for RateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.problem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateProblem {
    NoServiceRule,
    FinishNotPerSquareInch,
    NonNumericThickness,
    NegativeRate,
}

impl fmt::Display for RateProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RateProblem::NoServiceRule => "service has no quantity rule and always prices as zero",
            RateProblem::FinishNotPerSquareInch => "finish key is not priced per square inch",
            RateProblem::NonNumericThickness => "thickness key is not numeric",
            RateProblem::NegativeRate => "rate is negative and is ignored",
        };
        f.write_str(text)
    }
}

/// 服务的计量方式。未列出的服务数量恒为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRule {
    PerHole,
    PerInch,
    Unknown,
}

impl ServiceRule {
    /// 按服务标签精确匹配，大小写或空格不同即视为未知服务。
    pub fn for_service(label: &str) -> Self {
        match label {
            "Countersinking" => ServiceRule::PerHole,
            "Deburring" => ServiceRule::PerInch,
            _ => ServiceRule::Unknown,
        }
    }

    /// 由价格表键反查规则；无对应规则时返回 `None`。
    pub fn from_rate_key(key: &str) -> Option<Self> {
        let (name, unit) = key.split_once(rate_key::PER)?;
        let rule = match name {
            "countersinking" => ServiceRule::PerHole,
            "deburring" => ServiceRule::PerInch,
            _ => return None,
        };
        (rule.unit() == unit).then_some(rule)
    }

    pub fn unit(self) -> &'static str {
        match self {
            ServiceRule::PerHole => "hole",
            ServiceRule::PerInch => "inch",
            ServiceRule::Unknown => "unknown",
        }
    }

    pub fn quantity(self, measurement: &Measurement) -> f64 {
        match self {
            ServiceRule::PerHole => f64::from(measurement.hole_count),
            ServiceRule::PerInch => measurement.total_edge_length,
            ServiceRule::Unknown => 0.0,
        }
    }
}

/// 选项标签到价格表键的换算。
pub mod rate_key {
    use super::ServiceRule;

    pub const PER: &str = "_per_";
    pub const FINISH_SUFFIX: &str = "_per_sq_inch";

    /// 每个空格替换为 `_`，不折叠也不裁剪。
    pub fn underscore(label: &str) -> String {
        label.replace(' ', "_")
    }

    /// `Mild Steel` → `Mild_Steel`
    pub fn material(label: &str) -> String {
        underscore(label)
    }

    /// `0.048"` → `0_048`
    pub fn thickness(label: &str) -> String {
        label.trim().replace('"', "").replace('.', "_")
    }

    /// `Powder Coat` → `powder_coat_per_sq_inch`
    pub fn finish(label: &str) -> String {
        format!("{}{FINISH_SUFFIX}", underscore(label).to_lowercase())
    }

    /// `Countersinking` → `countersinking_per_hole`
    pub fn service(name: &str) -> String {
        let rule = ServiceRule::for_service(name);
        format!("{}{PER}{}", underscore(name).to_lowercase(), rule.unit())
    }

    /// 厚度键对应的数值（英寸）。
    pub fn thickness_value(key: &str) -> Option<f64> {
        key.replace('_', ".")
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }

    pub fn material_label(key: &str) -> String {
        key.replace('_', " ")
    }

    pub fn thickness_label(key: &str) -> String {
        format!("{}\"", key.replace('_', "."))
    }

    /// `powder_coat_per_sq_inch` → (`Powder Coat`, `sq_inch`)
    pub fn option_label(key: &str) -> (String, String) {
        let (name, unit) = key.split_once(PER).unwrap_or((key, "unknown"));
        let label = name
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        (label, unit.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub thickness: Option<String>,
    #[serde(default)]
    pub finish: Option<String>,
    #[serde(default)]
    pub services: BTreeSet<String>,
    #[serde(default = "Selection::default_quantity")]
    pub quantity: u32,
}

impl Selection {
    pub fn new(material: impl Into<String>, thickness: impl Into<String>) -> Self {
        Self {
            material: Some(material.into()),
            thickness: Some(thickness.into()),
            ..Self::default()
        }
    }

    pub fn with_finish(mut self, finish: impl Into<String>) -> Self {
        self.finish = Some(finish.into());
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.services.insert(service.into());
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// 数量至少为 1。
    #[inline]
    pub fn effective_quantity(&self) -> u32 {
        self.quantity.max(1)
    }

    fn default_quantity() -> u32 {
        1
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            material: None,
            thickness: None,
            finish: None,
            services: BTreeSet::new(),
            quantity: Self::default_quantity(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCategory {
    Material,
    Finish,
    Service,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub category: LineCategory,
    pub label: String,
    pub rate_key: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub unit_price: f64,
    pub quantity: u32,
    pub total_price: f64,
    #[serde(default)]
    pub lines: Vec<QuoteLine>,
}

impl Quote {
    pub fn zero(quantity: u32) -> Self {
        Self {
            unit_price: 0.0,
            quantity: quantity.max(1),
            total_price: 0.0,
            lines: Vec::new(),
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.total_price == 0.0
    }

    /// 以分为单位的总价，交给支付环节使用。
    pub fn total_cents(&self) -> i64 {
        (self.total_price * 100.0).round() as i64
    }
}

/// 计算报价。缺少价格表、测量、材料或厚度时返回零报价；缺失或非正的单价贡献 0。
pub fn price(
    measurement: Option<&Measurement>,
    rates: Option<&RateTable>,
    selection: &Selection,
) -> Quote {
    let quantity = selection.effective_quantity();
    let (Some(measurement), Some(rates)) = (measurement, rates) else {
        return Quote::zero(quantity);
    };
    let (Some(material), Some(thickness)) = (
        non_blank(selection.material.as_deref()),
        non_blank(selection.thickness.as_deref()),
    ) else {
        return Quote::zero(quantity);
    };

    let mut lines = Vec::new();

    let material_key = rate_key::material(material);
    let thickness_key = rate_key::thickness(thickness);
    push_line(
        &mut lines,
        LineCategory::Material,
        format!("{material} {thickness}"),
        format!("{material_key}.{thickness_key}"),
        measurement.area,
        rates.material_rate(&material_key, &thickness_key),
    );

    if let Some(finish) = non_blank(selection.finish.as_deref()) {
        let key = rate_key::finish(finish);
        let rate = rates.finish_rate(&key);
        push_line(
            &mut lines,
            LineCategory::Finish,
            finish.to_string(),
            key,
            measurement.area,
            rate,
        );
    }

    for service in &selection.services {
        let rule = ServiceRule::for_service(service);
        let key = rate_key::service(service);
        let rate = rates.service_rate(&key);
        push_line(
            &mut lines,
            LineCategory::Service,
            service.clone(),
            key,
            rule.quantity(measurement),
            rate,
        );
    }

    let unit_price: f64 = lines.iter().map(|line| line.amount).sum();
    let total_price = unit_price * f64::from(quantity);
    debug!(unit_price, quantity, total_price, lines = lines.len(), "报价完成");

    Quote {
        unit_price,
        quantity,
        total_price,
        lines,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn push_line(
    lines: &mut Vec<QuoteLine>,
    category: LineCategory,
    label: String,
    rate_key: String,
    quantity: f64,
    rate: f64,
) {
    if !(quantity > 0.0 && rate > 0.0) {
        debug!(rate_key = %rate_key, quantity, rate, "单价或数量为 0，跳过该项");
        return;
    }
    let amount = quantity * rate;
    debug!(rate_key = %rate_key, quantity, rate, amount, "计价项");
    lines.push(QuoteLine {
        category,
        label,
        rate_key,
        quantity,
        rate,
        amount,
    });
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThicknessOption {
    pub key: String,
    pub label: String,
    pub inches: Option<f64>,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialOption {
    pub key: String,
    pub label: String,
    pub thicknesses: Vec<ThicknessOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedOption {
    pub key: String,
    pub label: String,
    pub unit: String,
    pub rate: f64,
}

/// 由价格表派生的可选项列表。
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Catalog {
    pub materials: Vec<MaterialOption>,
    pub finishes: Vec<PricedOption>,
    pub services: Vec<PricedOption>,
}

impl Catalog {
    pub fn from_rates(rates: &RateTable) -> Self {
        let materials = rates
            .materials
            .iter()
            .map(|(key, thicknesses)| {
                let mut options: Vec<ThicknessOption> = thicknesses
                    .iter()
                    .map(|(thickness, rate)| ThicknessOption {
                        key: thickness.clone(),
                        label: rate_key::thickness_label(thickness),
                        inches: rate_key::thickness_value(thickness),
                        rate: rate.value(),
                    })
                    .collect();
                options.sort_by(|a, b| match (a.inches, b.inches) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => a.key.cmp(&b.key),
                });
                MaterialOption {
                    key: key.clone(),
                    label: rate_key::material_label(key),
                    thicknesses: options,
                }
            })
            .collect();

        Self {
            materials,
            finishes: priced_options(&rates.finishes),
            services: priced_options(&rates.services),
        }
    }
}

fn priced_options(rates: &BTreeMap<String, Rate>) -> Vec<PricedOption> {
    rates
        .iter()
        .map(|(key, rate)| {
            let (label, unit) = rate_key::option_label(key);
            PricedOption {
                key: key.clone(),
                label,
                unit,
                rate: rate.value(),
            }
        })
        .collect()
}
