use std::fs;
use std::path::Path;

use fabquote_core::{
    diagnostics::{Warning, WarningKind},
    drawing::{Arc, Circle, Drawing, DrawingUnits, Entity, Line, Polyline, PolylineVertex, Spline},
    geometry::Point2,
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("invalid drawing format: {0}")]
    Format(String),
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IoError {
    #[inline]
    pub fn is_format(&self) -> bool {
        matches!(self, IoError::Format(_))
    }
}

pub trait DrawingLoader {
    fn load(&self, path: &Path) -> Result<Drawing, IoError>;
}

/// 将 DXF 文本解析为实体列表。语法错误返回 `IoError::Format`；
/// 不支持或缺字段的实体被跳过并记录在 `Drawing::warnings` 中。
pub fn parse(raw: &str) -> Result<Drawing, IoError> {
    DxfParser::new(raw).parse().map_err(|err| match err {
        DxfError::Invalid { message } => IoError::Format(message),
        DxfError::Unsupported { feature } => IoError::Format(feature),
        DxfError::Malformed { message } => IoError::Format(message),
    })
}

#[derive(Debug, Clone, Copy)]
pub struct DxfFacade;

impl DxfFacade {
    pub fn new() -> Self {
        Self
    }

    /// 上传的原始字节按 UTF-8 有损解码后解析；旧版 DXF 中偶见的本地编码字符只影响图层名。
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<Drawing, IoError> {
        parse(&String::from_utf8_lossy(bytes))
    }
}

impl Default for DxfFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingLoader for DxfFacade {
    fn load(&self, path: &Path) -> Result<Drawing, IoError> {
        let data = fs::read(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_bytes(&data)
    }
}

#[derive(Debug)]
enum DxfError {
    Unsupported { feature: String },
    Malformed { message: String },
    Invalid { message: String },
}

impl DxfError {
    fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

struct DxfParser<'a> {
    reader: DxfReader<'a>,
    drawing: Drawing,
}

impl<'a> DxfParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            reader: DxfReader::new(source),
            drawing: Drawing::new(),
        }
    }

    fn parse(mut self) -> Result<Drawing, DxfError> {
        let mut saw_entities = false;
        while let Some((code, value)) = self.reader.next_pair()? {
            if code == 999 {
                continue;
            }
            if code != 0 {
                return Err(DxfError::invalid(format!(
                    "意外的组码 {code}（期望 0 表示 SECTION/EOF）"
                )));
            }
            match value.trim() {
                "SECTION" => {
                    let (name_code, name) = self
                        .reader
                        .next_pair()?
                        .ok_or_else(|| DxfError::invalid("SECTION 缺少名称（组码 2）"))?;
                    if name_code != 2 {
                        return Err(DxfError::invalid(format!(
                            "SECTION 名称使用了组码 {name_code}（期望 2）"
                        )));
                    }
                    match name.trim() {
                        "HEADER" => self.parse_header()?,
                        "ENTITIES" => {
                            saw_entities = true;
                            self.parse_entities()?;
                        }
                        other => {
                            debug!(section = other, "跳过 DXF 段");
                            self.skip_section()?;
                        }
                    }
                }
                "EOF" => break,
                unexpected => {
                    return Err(DxfError::invalid(format!(
                        "意外的标记 {unexpected}，期望 SECTION 或 EOF"
                    )));
                }
            }
        }

        if !saw_entities {
            return Err(DxfError::invalid("缺少 ENTITIES 段"));
        }
        Ok(self.drawing)
    }

    fn skip_section(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) if value.trim() == "ENDSEC" => break,
                Some(_) => continue,
                None => {
                    return Err(DxfError::invalid("SECTION 未找到 ENDSEC 终止标记"));
                }
            }
        }
        Ok(())
    }

    fn parse_header(&mut self) -> Result<(), DxfError> {
        let mut current_variable: Option<String> = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) if value.trim() == "ENDSEC" => break,
                Some((9, name)) => current_variable = Some(name.trim().to_string()),
                Some((70, value)) if current_variable.as_deref() == Some("$INSUNITS") => {
                    let code = parse_i32(&value, "$INSUNITS（组码 70）")?;
                    self.drawing
                        .set_declared_units(DrawingUnits::from_insunits(code));
                }
                Some(_) => {}
                None => return Err(DxfError::invalid("HEADER 段未找到 ENDSEC 终止标记")),
            }
        }
        Ok(())
    }

    fn parse_entities(&mut self) -> Result<(), DxfError> {
        loop {
            let (code, value) = match self.reader.next_pair()? {
                Some(pair) => pair,
                None => return Err(DxfError::invalid("ENTITIES 段提前结束")),
            };
            if code != 0 {
                return Err(DxfError::invalid(format!(
                    "ENTITIES 段遇到组码 {code}（期望 0 表示实体起始）"
                )));
            }

            let kind = value.trim().to_string();
            let parsed = match kind.as_str() {
                "ENDSEC" => break,
                "SEQEND" => {
                    self.skip_entity_body()?;
                    continue;
                }
                "POLYLINE" => self.parse_polyline_entity(),
                other => self.parse_entity(other),
            };

            match parsed {
                Ok(entity) => self.drawing.push_entity(entity),
                Err(DxfError::Unsupported { feature }) => {
                    self.skip_entity_body()?;
                    warn!(entity = %kind, "{feature}");
                    self.drawing
                        .push_warning(Warning::new(WarningKind::UnsupportedEntity, feature));
                }
                Err(DxfError::Malformed { message }) => {
                    warn!(entity = %kind, "{message}");
                    self.drawing
                        .push_warning(Warning::new(WarningKind::MalformedEntity, message));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn parse_entity(&mut self, kind: &str) -> Result<Entity, DxfError> {
        match kind {
            "LINE" => self.parse_line(),
            "CIRCLE" => self.parse_circle(),
            "ARC" => self.parse_arc(),
            "LWPOLYLINE" => self.parse_lwpolyline(),
            "SPLINE" => self.parse_spline(),
            other => Err(DxfError::unsupported(format!("暂不支持的实体类型 {other}"))),
        }
    }

    fn parse_line(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut start_x = None;
        let mut start_y = None;
        let mut end_x = None;
        let mut end_y = None;
        let mut duplicate = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => {
                    let slot = match code {
                        8 => {
                            layer = Some(value.trim().to_string());
                            continue;
                        }
                        10 => (&mut start_x, "LINE 起点 X（组码 10）"),
                        20 => (&mut start_y, "LINE 起点 Y（组码 20）"),
                        11 => (&mut end_x, "LINE 终点 X（组码 11）"),
                        21 => (&mut end_y, "LINE 终点 Y（组码 21）"),
                        _ => continue,
                    };
                    assign_coord(slot.0, &value, slot.1, &mut duplicate)?;
                }
                None => return Err(DxfError::invalid("LINE 未正确结束")),
            }
        }

        reject_duplicate(duplicate)?;
        let layer = layer.unwrap_or_else(|| "0".to_string());
        let sx = start_x.ok_or_else(|| DxfError::malformed("LINE 缺少起点 X（组码 10）"))?;
        let sy = start_y.ok_or_else(|| DxfError::malformed("LINE 缺少起点 Y（组码 20）"))?;
        let ex = end_x.ok_or_else(|| DxfError::malformed("LINE 缺少终点 X（组码 11）"))?;
        let ey = end_y.ok_or_else(|| DxfError::malformed("LINE 缺少终点 Y（组码 21）"))?;

        Ok(Entity::Line(Line {
            start: Point2::new(sx, sy),
            end: Point2::new(ex, ey),
            layer,
        }))
    }

    fn parse_circle(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut center_x = None;
        let mut center_y = None;
        let mut radius = None;
        let mut duplicate = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => {
                    let slot = match code {
                        8 => {
                            layer = Some(value.trim().to_string());
                            continue;
                        }
                        10 => (&mut center_x, "CIRCLE 圆心 X（组码 10）"),
                        20 => (&mut center_y, "CIRCLE 圆心 Y（组码 20）"),
                        40 => (&mut radius, "CIRCLE 半径（组码 40）"),
                        _ => continue,
                    };
                    assign_coord(slot.0, &value, slot.1, &mut duplicate)?;
                }
                None => return Err(DxfError::invalid("CIRCLE 未正确结束")),
            }
        }

        reject_duplicate(duplicate)?;
        let layer = layer.unwrap_or_else(|| "0".to_string());
        let cx = center_x.ok_or_else(|| DxfError::malformed("CIRCLE 缺少圆心 X（组码 10）"))?;
        let cy = center_y.ok_or_else(|| DxfError::malformed("CIRCLE 缺少圆心 Y（组码 20）"))?;
        let radius = radius.ok_or_else(|| DxfError::malformed("CIRCLE 缺少半径（组码 40）"))?;
        if radius < 0.0 {
            return Err(DxfError::malformed(format!("CIRCLE 半径为负数（{radius}）")));
        }

        Ok(Entity::Circle(Circle {
            center: Point2::new(cx, cy),
            radius,
            layer,
        }))
    }

    fn parse_arc(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut center_x = None;
        let mut center_y = None;
        let mut radius = None;
        let mut start_angle = None;
        let mut end_angle = None;
        let mut duplicate = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => {
                    let slot = match code {
                        8 => {
                            layer = Some(value.trim().to_string());
                            continue;
                        }
                        10 => (&mut center_x, "ARC 圆心 X（组码 10）"),
                        20 => (&mut center_y, "ARC 圆心 Y（组码 20）"),
                        40 => (&mut radius, "ARC 半径（组码 40）"),
                        50 => (&mut start_angle, "ARC 起始角（组码 50）"),
                        51 => (&mut end_angle, "ARC 终止角（组码 51）"),
                        _ => continue,
                    };
                    assign_coord(slot.0, &value, slot.1, &mut duplicate)?;
                }
                None => return Err(DxfError::invalid("ARC 未正确结束")),
            }
        }

        reject_duplicate(duplicate)?;
        let layer = layer.unwrap_or_else(|| "0".to_string());
        let cx = center_x.ok_or_else(|| DxfError::malformed("ARC 缺少圆心 X（组码 10）"))?;
        let cy = center_y.ok_or_else(|| DxfError::malformed("ARC 缺少圆心 Y（组码 20）"))?;
        let radius = radius.ok_or_else(|| DxfError::malformed("ARC 缺少半径（组码 40）"))?;
        let start_angle =
            start_angle.ok_or_else(|| DxfError::malformed("ARC 缺少起始角（组码 50）"))?;
        let end_angle =
            end_angle.ok_or_else(|| DxfError::malformed("ARC 缺少终止角（组码 51）"))?;
        if radius < 0.0 {
            return Err(DxfError::malformed(format!("ARC 半径为负数（{radius}）")));
        }

        Ok(Entity::Arc(Arc {
            center: Point2::new(cx, cy),
            radius,
            start_angle,
            end_angle,
            layer,
        }))
    }

    fn parse_lwpolyline(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut is_closed = false;
        let mut vertices: Vec<PolylineVertex> = Vec::new();
        let mut pending_x: Option<f64> = None;
        let mut pending_y: Option<f64> = None;
        let mut problem: Option<String> = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    70 => {
                        let flag = parse_i32(&value, "LWPOLYLINE 标志")?;
                        is_closed = flag & 0x01 == 0x01;
                    }
                    10 => {
                        let x = parse_f64(&value, "LWPOLYLINE 顶点 X")?;
                        if let Some(y) = pending_y.take() {
                            vertices.push(PolylineVertex::new(Point2::new(x, y)));
                        } else if pending_x.replace(x).is_some() {
                            problem.get_or_insert_with(|| {
                                "LWPOLYLINE 顶点缺少对应的 Y（组码 20）".to_string()
                            });
                        }
                    }
                    20 => {
                        let y = parse_f64(&value, "LWPOLYLINE 顶点 Y")?;
                        if let Some(x) = pending_x.take() {
                            vertices.push(PolylineVertex::new(Point2::new(x, y)));
                        } else if pending_y.replace(y).is_some() {
                            problem.get_or_insert_with(|| {
                                "LWPOLYLINE 顶点缺少对应的 X（组码 10）".to_string()
                            });
                        }
                    }
                    42 => {
                        let bulge = parse_f64(&value, "LWPOLYLINE 顶点 bulge")?;
                        match vertices.last_mut() {
                            Some(vertex) => vertex.bulge = bulge,
                            None => {
                                problem.get_or_insert_with(|| {
                                    "LWPOLYLINE 在定义首个顶点前遇到 bulge（组码 42）".to_string()
                                });
                            }
                        }
                    }
                    _ => {}
                },
                None => return Err(DxfError::invalid("LWPOLYLINE 未正确结束")),
            }
        }

        if let Some(message) = problem {
            return Err(DxfError::malformed(message));
        }
        if pending_x.is_some() || pending_y.is_some() {
            return Err(DxfError::malformed(
                "LWPOLYLINE 顶点坐标成对出现（组码 10/20），检测到不完整的顶点",
            ));
        }
        if vertices.is_empty() {
            return Err(DxfError::malformed("LWPOLYLINE 未解析到任何顶点"));
        }

        let layer = layer.unwrap_or_else(|| "0".to_string());
        Ok(Entity::Polyline(Polyline {
            vertices,
            is_closed,
            layer,
        }))
    }

    /// 旧式 POLYLINE：头部之后跟随 VERTEX 记录并以 SEQEND 结束。网格/多面体/三维多段线不参与报价。
    fn parse_polyline_entity(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut flags: i16 = 0;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    70 => flags = parse_i16(&value, "POLYLINE 标志（组码 70）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("POLYLINE 未正确结束")),
            }
        }

        if flags & (0x08 | 0x10 | 0x40) != 0 {
            self.skip_polyline_sequence()?;
            return Err(DxfError::unsupported(format!(
                "POLYLINE 标志 {flags} 表示三维多段线或网格，已跳过"
            )));
        }

        let mut vertices = Vec::new();
        let mut problem: Option<String> = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => match value.trim() {
                    "VERTEX" => match self.parse_vertex()? {
                        Some(vertex) => vertices.push(vertex),
                        None => {
                            problem.get_or_insert_with(|| {
                                "POLYLINE 的 VERTEX 缺少坐标（组码 10/20）".to_string()
                            });
                        }
                    },
                    "SEQEND" => {
                        self.skip_entity_body()?;
                        break;
                    }
                    _ => {
                        self.reader.put_back((0, value));
                        break;
                    }
                },
                Some(_) => continue,
                None => return Err(DxfError::invalid("POLYLINE 未找到 SEQEND 终止标记")),
            }
        }

        if let Some(message) = problem {
            return Err(DxfError::malformed(message));
        }
        if vertices.is_empty() {
            return Err(DxfError::malformed("POLYLINE 未解析到任何顶点"));
        }

        let layer = layer.unwrap_or_else(|| "0".to_string());
        Ok(Entity::Polyline(Polyline {
            vertices,
            is_closed: flags & 0x01 != 0,
            layer,
        }))
    }

    fn parse_vertex(&mut self) -> Result<Option<PolylineVertex>, DxfError> {
        let mut x = None;
        let mut y = None;
        let mut bulge = 0.0;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    10 => x = Some(parse_f64(&value, "VERTEX X（组码 10）")?),
                    20 => y = Some(parse_f64(&value, "VERTEX Y（组码 20）")?),
                    42 => bulge = parse_f64(&value, "VERTEX bulge（组码 42）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("VERTEX 未正确结束")),
            }
        }
        Ok(match (x, y) {
            (Some(x), Some(y)) => Some(PolylineVertex::with_bulge(Point2::new(x, y), bulge)),
            _ => None,
        })
    }

    fn skip_polyline_sequence(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => match value.trim() {
                    "VERTEX" => self.skip_entity_body()?,
                    "SEQEND" => {
                        self.skip_entity_body()?;
                        break;
                    }
                    _ => {
                        self.reader.put_back((0, value));
                        break;
                    }
                },
                Some(_) => continue,
                None => return Err(DxfError::invalid("POLYLINE 未找到 SEQEND 终止标记")),
            }
        }
        Ok(())
    }

    fn parse_spline(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut flags: i16 = 0;
        let mut degree: Option<i16> = None;
        let mut knot_values: Vec<f64> = Vec::new();
        let mut weights: Vec<f64> = Vec::new();
        let mut control_points: Vec<Point2> = Vec::new();
        let mut fit_point_count = 0usize;
        let mut pending_control_x: Option<f64> = None;
        let mut problem: Option<String> = None;

        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    70 => flags = parse_i16(&value, "SPLINE 类型标志（组码 70）")?,
                    71 => degree = Some(parse_i16(&value, "SPLINE 阶数（组码 71）")?),
                    72 | 73 | 74 => {
                        // 计数信息，仅校验格式
                        let _ = parse_i32(&value, "SPLINE 计数信息")?;
                    }
                    40 => knot_values.push(parse_f64(&value, "SPLINE 节点值（组码 40）")?),
                    41 => weights.push(parse_f64(&value, "SPLINE 权重（组码 41）")?),
                    10 => {
                        let x = parse_f64(&value, "SPLINE 控制点 X（组码 10）")?;
                        if pending_control_x.replace(x).is_some() {
                            problem.get_or_insert_with(|| {
                                "SPLINE 控制点 X（组码 10）在未提供 Y 之前重复出现".to_string()
                            });
                        }
                    }
                    20 => {
                        let y = parse_f64(&value, "SPLINE 控制点 Y（组码 20）")?;
                        match pending_control_x.take() {
                            Some(x) => control_points.push(Point2::new(x, y)),
                            None => {
                                problem.get_or_insert_with(|| {
                                    "SPLINE 控制点 Y（组码 20）缺少对应的 X".to_string()
                                });
                            }
                        }
                    }
                    11 => {
                        let _ = parse_f64(&value, "SPLINE 拟合点 X（组码 11）")?;
                        fit_point_count += 1;
                    }
                    _ => {}
                },
                None => return Err(DxfError::invalid("SPLINE 未正确结束")),
            }
        }

        if let Some(message) = problem {
            return Err(DxfError::malformed(message));
        }
        if let Some(x) = pending_control_x {
            return Err(DxfError::malformed(format!(
                "SPLINE 控制点 X={x} 缺少对应的 Y（组码 20）"
            )));
        }
        if control_points.len() < 2 {
            return Err(DxfError::malformed(format!(
                "SPLINE 控制点不足（{} 个控制点，{fit_point_count} 个拟合点）",
                control_points.len()
            )));
        }

        let layer = layer.unwrap_or_else(|| "0".to_string());
        let degree = match degree {
            Some(value) if value > 0 => i32::from(value),
            _ => 3,
        };

        Ok(Entity::Spline(Spline {
            degree,
            is_closed: flags & 0x01 != 0,
            control_points,
            knot_values,
            weights,
            layer,
        }))
    }

    fn skip_entity_body(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some(_) => continue,
                None => break,
            }
        }
        Ok(())
    }
}

struct DxfReader<'a> {
    lines: std::str::Lines<'a>,
    buffer: Option<(i32, String)>,
    line_number: usize,
}

impl<'a> DxfReader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines(),
            buffer: None,
            line_number: 0,
        }
    }

    fn next_pair(&mut self) -> Result<Option<(i32, String)>, DxfError> {
        if let Some(pair) = self.buffer.take() {
            return Ok(Some(pair));
        }

        let code_line = loop {
            match self.lines.next() {
                Some(line) => {
                    self.line_number += 1;
                    // 文件末尾的空行不视为组码
                    if line.trim().is_empty() && self.at_trailing_blank() {
                        return Ok(None);
                    }
                    break line;
                }
                None => return Ok(None),
            }
        };

        let value_line = match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                line
            }
            None => {
                return Err(DxfError::invalid(format!(
                    "文件在第 {} 行结束，缺少与组码对应的值行",
                    self.line_number
                )));
            }
        };

        let code = code_line.trim().parse::<i32>().map_err(|_| {
            DxfError::invalid(format!(
                "第 {} 行的组码 \"{}\" 无法解析为整数",
                self.line_number - 1,
                code_line.trim()
            ))
        })?;
        let value = value_line.trim_end_matches('\r').to_string();
        Ok(Some((code, value)))
    }

    fn at_trailing_blank(&self) -> bool {
        self.lines.clone().all(|line| line.trim().is_empty())
    }

    fn put_back(&mut self, pair: (i32, String)) {
        debug_assert!(self.buffer.is_none(), "DXF pair 只能回退一次");
        self.buffer = Some(pair);
    }
}

/// 写入一次性的数值字段。重复出现只记录首个问题，由调用方在实体结束后统一报告。
fn assign_coord(
    slot: &mut Option<f64>,
    raw: &str,
    context: &str,
    duplicate: &mut Option<String>,
) -> Result<(), DxfError> {
    let value = parse_f64(raw, context)?;
    if slot.is_some() {
        duplicate.get_or_insert_with(|| format!("{context} 出现重复值"));
        return Ok(());
    }
    *slot = Some(value);
    Ok(())
}

fn reject_duplicate(duplicate: Option<String>) -> Result<(), DxfError> {
    match duplicate {
        Some(message) => Err(DxfError::malformed(message)),
        None => Ok(()),
    }
}

fn parse_f64(raw: &str, context: &str) -> Result<f64, DxfError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DxfError::invalid(format!("{context} 不是有限数值（值：\"{raw}\"）")))
    }
}

fn parse_i32(raw: &str, context: &str) -> Result<i32, DxfError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))
}

fn parse_i16(raw: &str, context: &str) -> Result<i16, DxfError> {
    let value = parse_i32(raw, context)?;
    i16::try_from(value)
        .map_err(|_| DxfError::invalid(format!("{context} 超出 i16 范围（值：{value}）")))
}
