use std::fmt;

use fabquote_core::{
    drawing::DrawingUnits,
    geometry::Point2,
    measurement::Measurement,
    path::{Path, PathModel, sweep_degrees},
};
use tracing::{debug, warn};

use crate::errors::MeasureError;

pub const MM_PER_INCH: f64 = 25.4;
pub const DEFAULT_INCH_THRESHOLD: f64 = 20.0;
pub const DEFAULT_MERGE_TOLERANCE: f64 = 0.001;

const ANGLE_EPSILON: f64 = 1e-9;

/// 决定原始图纸单位到英寸的换算系数。
pub trait UnitPolicy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// `width`/`height` 为简化后模型的原始范围。
    fn scale_factor(&self, width: f64, height: f64, declared: Option<DrawingUnits>) -> f64;
}

/// 任一边超过阈值即视为毫米图纸。
#[derive(Debug, Clone, Copy)]
pub struct ThresholdUnitPolicy {
    threshold: f64,
}

impl ThresholdUnitPolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for ThresholdUnitPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_INCH_THRESHOLD)
    }
}

impl UnitPolicy for ThresholdUnitPolicy {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn scale_factor(&self, width: f64, height: f64, _declared: Option<DrawingUnits>) -> f64 {
        if width > self.threshold || height > self.threshold {
            1.0 / MM_PER_INCH
        } else {
            1.0
        }
    }
}

/// 优先采用 `$INSUNITS` 声明的单位，未声明或无法识别时退回阈值推断。
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredUnitPolicy {
    fallback: ThresholdUnitPolicy,
}

impl DeclaredUnitPolicy {
    pub fn new(fallback: ThresholdUnitPolicy) -> Self {
        Self { fallback }
    }
}

impl UnitPolicy for DeclaredUnitPolicy {
    fn name(&self) -> &'static str {
        "declared"
    }

    fn scale_factor(&self, width: f64, height: f64, declared: Option<DrawingUnits>) -> f64 {
        match declared {
            Some(DrawingUnits::Inches) => 1.0,
            Some(DrawingUnits::Millimeters) => 1.0 / MM_PER_INCH,
            other => self.fallback.scale_factor(width, height, other),
        }
    }
}

#[derive(Debug)]
pub struct GeometryMeasurer {
    merge_tolerance: f64,
    unit_policy: Box<dyn UnitPolicy>,
}

impl GeometryMeasurer {
    pub fn new() -> Self {
        Self::with_unit_policy(ThresholdUnitPolicy::default())
    }

    pub fn with_unit_policy(policy: impl UnitPolicy + 'static) -> Self {
        Self {
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
            unit_policy: Box::new(policy),
        }
    }

    pub fn with_merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = if tolerance.is_finite() && tolerance >= 0.0 {
            tolerance
        } else {
            DEFAULT_MERGE_TOLERANCE
        };
        self
    }

    #[inline]
    pub fn unit_policy(&self) -> &dyn UnitPolicy {
        self.unit_policy.as_ref()
    }

    /// 永不失败的测量入口；内部错误降级为零测量并记录日志。
    pub fn measure(&self, model: &PathModel) -> Measurement {
        self.measure_with_units(model, None)
    }

    pub fn measure_with_units(
        &self,
        model: &PathModel,
        declared: Option<DrawingUnits>,
    ) -> Measurement {
        match self.try_measure(model, declared) {
            Ok(measurement) => measurement,
            Err(err) => {
                warn!(error = %err, paths = model.len(), "测量失败，返回零测量");
                Measurement::zero()
            }
        }
    }

    pub fn try_measure(
        &self,
        model: &PathModel,
        declared: Option<DrawingUnits>,
    ) -> Result<Measurement, MeasureError> {
        if let Some((id, _)) = model.iter().find(|(_, path)| !path.is_valid()) {
            return Err(MeasureError::InvalidPath(id));
        }

        let simplified = simplify(model, self.merge_tolerance);
        let bounds = simplified.bounds().ok_or(MeasureError::EmptyModel)?;
        let raw_width = bounds.width();
        let raw_height = bounds.height();
        let factor = self
            .unit_policy
            .scale_factor(raw_width, raw_height, declared);

        let width = raw_width * factor;
        let height = raw_height * factor;
        let total_edge_length = simplified.total_length() * factor;
        let hole_count = u32::try_from(simplified.circle_count()).unwrap_or(u32::MAX);

        for (name, value) in [
            ("width", width),
            ("height", height),
            ("total_edge_length", total_edge_length),
        ] {
            if !value.is_finite() {
                return Err(MeasureError::NonFinite(name));
            }
        }

        debug!(
            policy = self.unit_policy.name(),
            factor,
            original_paths = model.len(),
            simplified_paths = simplified.len(),
            "测量完成"
        );

        Ok(Measurement {
            width,
            height,
            area: width * height,
            total_edge_length,
            hole_count,
        })
    }
}

impl Default for GeometryMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

/// 端点吸附、去除退化与重复路径、合并重叠的共线线段。
/// 圆弧保留原始参数，其端点作为吸附锚点供相接的直线使用。
pub fn simplify(model: &PathModel, tolerance: f64) -> PathModel {
    let mut anchors = AnchorSet::new(tolerance);
    let mut kept: Vec<Path> = Vec::with_capacity(model.len());

    for (_, path) in model.iter() {
        let snapped = match *path {
            Path::Line { start, end } => Path::line(anchors.snap(start), anchors.snap(end)),
            Path::Arc { .. } => {
                if let Some((start, end)) = path.endpoints() {
                    anchors.snap(start);
                    anchors.snap(end);
                }
                *path
            }
            Path::Circle { .. } => *path,
        };

        if is_degenerate(&snapped, tolerance) {
            continue;
        }
        if kept
            .iter()
            .any(|existing| same_path(existing, &snapped, tolerance))
        {
            continue;
        }
        kept.push(snapped);
    }

    fuse_collinear_lines(&mut kept, tolerance);
    kept.into_iter().collect()
}

struct AnchorSet {
    tolerance: f64,
    points: Vec<Point2>,
}

impl AnchorSet {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            points: Vec::new(),
        }
    }

    fn snap(&mut self, point: Point2) -> Point2 {
        if let Some(anchor) = self
            .points
            .iter()
            .find(|anchor| anchor.distance_to(point) <= self.tolerance)
        {
            return *anchor;
        }
        self.points.push(point);
        point
    }
}

fn is_degenerate(path: &Path, tolerance: f64) -> bool {
    match *path {
        Path::Line { start, end } => start.distance_to(end) <= tolerance,
        Path::Arc { radius, .. } => radius <= tolerance || path.length() <= tolerance,
        Path::Circle { radius, .. } => radius <= tolerance,
    }
}

fn same_path(a: &Path, b: &Path, tolerance: f64) -> bool {
    match (*a, *b) {
        (Path::Line { start: s1, end: e1 }, Path::Line { start: s2, end: e2 }) => {
            (s1.distance_to(s2) <= tolerance && e1.distance_to(e2) <= tolerance)
                || (s1.distance_to(e2) <= tolerance && e1.distance_to(s2) <= tolerance)
        }
        (
            Path::Arc {
                center: c1,
                radius: r1,
                start_angle: a1,
                end_angle: b1,
            },
            Path::Arc {
                center: c2,
                radius: r2,
                start_angle: a2,
                end_angle: b2,
            },
        ) => {
            c1.distance_to(c2) <= tolerance
                && (r1 - r2).abs() <= tolerance
                && angle_close(a1, a2)
                && angle_close(b1, b2)
        }
        (
            Path::Circle {
                center: c1,
                radius: r1,
            },
            Path::Circle {
                center: c2,
                radius: r2,
            },
        ) => c1.distance_to(c2) <= tolerance && (r1 - r2).abs() <= tolerance,
        _ => false,
    }
}

fn angle_close(a: f64, b: f64) -> bool {
    let diff = sweep_degrees(a, b);
    diff <= ANGLE_EPSILON || 360.0 - diff <= ANGLE_EPSILON
}

/// 合并共线且重叠的直线，直至稳定。
/// 合并后的线段留在较小的下标处，并与其余所有线段重新比较。
fn fuse_collinear_lines(paths: &mut Vec<Path>, tolerance: f64) {
    let mut i = 0;
    while i < paths.len() {
        let mut j = 0;
        while j < paths.len() {
            if j == i {
                j += 1;
                continue;
            }
            let (low, high) = (i.min(j), i.max(j));
            match fuse_pair(&paths[low], &paths[high], tolerance) {
                Some(merged) => {
                    paths[low] = merged;
                    paths.remove(high);
                    i = low;
                    j = 0;
                }
                None => j += 1,
            }
        }
        i += 1;
    }
}

fn fuse_pair(a: &Path, b: &Path, tolerance: f64) -> Option<Path> {
    let (Path::Line { start: a0, end: a1 }, Path::Line { start: b0, end: b1 }) = (*a, *b) else {
        return None;
    };

    let origin = a0.as_vec2();
    let axis = a1.as_vec2() - origin;
    let length = axis.length();
    if length <= tolerance {
        return None;
    }
    let dir = axis / length;

    let offset = |p: Point2| (p.as_vec2() - origin).perp_dot(dir).abs();
    if offset(b0) > tolerance || offset(b1) > tolerance {
        return None;
    }

    let project = |p: Point2| (p.as_vec2() - origin).dot(dir);
    let (tb0, tb1) = (project(b0), project(b1));
    let (b_min, b_max) = (tb0.min(tb1), tb0.max(tb1));
    let overlap = length.min(b_max) - b_min.max(0.0);
    if overlap <= tolerance {
        return None;
    }

    let lo = b_min.min(0.0);
    let hi = b_max.max(length);
    Some(Path::line(
        Point2::from_vec(origin + dir * lo),
        Point2::from_vec(origin + dir * hi),
    ))
}
