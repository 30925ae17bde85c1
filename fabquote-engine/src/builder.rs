use fabquote_core::{
    diagnostics::{Warning, WarningKind},
    drawing::{Entity, Polyline, PolylineVertex, Spline},
    geometry::{Point2, Vector2},
    path::{Path, PathModel},
};
use glam::DVec3;
use tracing::{debug, warn};

use crate::errors::EngineError;

/// 样条每阶的采样段数。
const SPLINE_SEGMENTS_PER_DEGREE: usize = 30;
const CHORD_EPSILON: f64 = 1e-12;

/// 构建结果：路径模型以及转换过程中产生的警告。
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub model: PathModel,
    pub warnings: Vec<Warning>,
}

/// 将解析出的实体归一化为只含直线、圆弧、圆的路径模型。
#[derive(Debug, Clone)]
pub struct PathModelBuilder {
    segments_per_degree: usize,
}

impl PathModelBuilder {
    pub fn new() -> Self {
        Self {
            segments_per_degree: SPLINE_SEGMENTS_PER_DEGREE,
        }
    }

    pub fn build(&self, entities: &[Entity]) -> Result<PathModel, EngineError> {
        self.build_report(entities).map(|report| report.model)
    }

    pub fn build_report(&self, entities: &[Entity]) -> Result<BuildReport, EngineError> {
        let mut model = PathModel::new();
        let mut warnings = Vec::new();

        for (index, entity) in entities.iter().enumerate() {
            match self.convert(entity, &mut warnings) {
                Ok(paths) => {
                    for path in paths {
                        model.insert(path);
                    }
                }
                Err(reason) => {
                    warn!(
                        index,
                        kind = entity.kind_name(),
                        layer = entity.layer_name(),
                        reason = %reason,
                        "实体转换失败，已跳过"
                    );
                    warnings.push(Warning::new(
                        WarningKind::EntitySkipped,
                        format!("{} #{index}: {reason}", entity.kind_name()),
                    ));
                }
            }
        }

        if model.is_empty() {
            return Err(EngineError::EmptyModel);
        }
        debug!(paths = model.len(), warnings = warnings.len(), "路径模型构建完成");
        Ok(BuildReport { model, warnings })
    }

    fn convert(&self, entity: &Entity, warnings: &mut Vec<Warning>) -> Result<Vec<Path>, String> {
        let paths = match entity {
            Entity::Line(line) => vec![Path::line(line.start, line.end)],
            Entity::Arc(arc) => vec![Path::arc(
                arc.center,
                arc.radius,
                arc.start_angle,
                arc.end_angle,
            )],
            Entity::Circle(circle) => vec![Path::circle(circle.center, circle.radius)],
            Entity::Polyline(polyline) => polyline_paths(polyline, warnings),
            Entity::Spline(spline) => {
                let samples = self.sample_spline(spline)?;
                samples
                    .windows(2)
                    .map(|pair| Path::line(pair[0], pair[1]))
                    .collect()
            }
        };

        if let Some(bad) = paths.iter().find(|path| !path.is_valid()) {
            return Err(format!("生成的 {} 含非法参数", bad.kind_name()));
        }
        Ok(paths)
    }

    /// 以均匀参数步长采样 B 样条（支持有理权重），返回折线点列。
    fn sample_spline(&self, spline: &Spline) -> Result<Vec<Point2>, String> {
        let points = &spline.control_points;
        let count = points.len();
        if count < 2 {
            return Err(format!("控制点不足（{count}）"));
        }

        let requested = usize::try_from(spline.degree).unwrap_or(0).max(1);
        let degree = requested.min(count - 1);
        if degree != requested {
            debug!(requested, degree, "样条阶数超过控制点数，已降阶");
        }

        let knots = if knots_are_consistent(&spline.knot_values, count, degree) {
            spline.knot_values.clone()
        } else {
            if !spline.knot_values.is_empty() {
                debug!(
                    knots = spline.knot_values.len(),
                    expected = count + degree + 1,
                    "样条节点向量不一致，改用夹紧均匀节点"
                );
            }
            clamped_uniform_knots(count, degree)
        };
        let weights: Vec<f64> = if spline.weights.len() == count
            && spline.weights.iter().all(|w| w.is_finite() && *w > 0.0)
        {
            spline.weights.clone()
        } else {
            vec![1.0; count]
        };

        let start = knots[degree];
        let end = knots[count];
        if !(end > start) {
            return Err("节点向量定义域为空".to_string());
        }

        let segments = (self.segments_per_degree * degree).max(self.segments_per_degree);
        let mut samples = Vec::with_capacity(segments + 1);
        for step in 0..=segments {
            let t = start + (end - start) * step as f64 / segments as f64;
            samples.push(de_boor(points, &weights, &knots, degree, t));
        }
        Ok(samples)
    }
}

impl Default for PathModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 相邻顶点两两成段；仅闭合多段线回绕到首点。
fn polyline_paths(polyline: &Polyline, warnings: &mut Vec<Warning>) -> Vec<Path> {
    let vertices = &polyline.vertices;
    let count = vertices.len();
    let segment_count = match count {
        0 | 1 => 0,
        _ if polyline.is_closed => count,
        _ => count - 1,
    };

    (0..segment_count)
        .map(|index| {
            let from = &vertices[index];
            let to = &vertices[(index + 1) % count];
            segment_path(from, to.position, warnings)
        })
        .collect()
}

fn segment_path(from: &PolylineVertex, to: Point2, warnings: &mut Vec<Warning>) -> Path {
    if from.bulge == 0.0 {
        return Path::line(from.position, to);
    }
    match bulge_arc(from.position, to, from.bulge) {
        Some(arc) => arc,
        None => {
            warn!(
                bulge = from.bulge,
                x = from.position.x(),
                y = from.position.y(),
                "bulge 无法转换为圆弧，按直线处理"
            );
            warnings.push(Warning::new(
                WarningKind::BulgeFallback,
                format!(
                    "bulge {} at ({}, {}) replaced by a straight segment",
                    from.bulge,
                    from.position.x(),
                    from.position.y()
                ),
            ));
            Path::line(from.position, to)
        }
    }
}

/// `bulge = tan(θ/4)`，正值表示从起点逆时针到终点。
pub fn bulge_arc(start: Point2, end: Point2, bulge: f64) -> Option<Path> {
    if !bulge.is_finite() {
        return None;
    }
    let chord_vec = Vector2::from_points(start, end);
    let chord = chord_vec.length();
    if chord <= CHORD_EPSILON {
        return None;
    }

    let sweep = 4.0 * bulge.atan();
    let radius = (chord / (2.0 * (sweep / 2.0).sin())).abs();
    let offset = chord * (1.0 - bulge * bulge) / (4.0 * bulge);
    let normal = chord_vec.perp().as_vec2() / chord;
    let center = Point2::from_vec(start.midpoint(end).as_vec2() + normal * offset);

    let start_angle = Vector2::from_points(center, start).angle_degrees();
    let end_angle = Vector2::from_points(center, end).angle_degrees();
    let arc = if bulge > 0.0 {
        Path::arc(center, radius, start_angle, end_angle)
    } else {
        Path::arc(center, radius, end_angle, start_angle)
    };
    arc.is_valid().then_some(arc)
}

fn knots_are_consistent(knots: &[f64], count: usize, degree: usize) -> bool {
    knots.len() == count + degree + 1
        && knots.iter().all(|k| k.is_finite())
        && knots.windows(2).all(|pair| pair[0] <= pair[1])
}

fn clamped_uniform_knots(count: usize, degree: usize) -> Vec<f64> {
    let interior = count - degree;
    let mut knots = Vec::with_capacity(count + degree + 1);
    knots.extend(std::iter::repeat(0.0).take(degree + 1));
    for index in 1..interior {
        knots.push(index as f64 / interior as f64);
    }
    knots.extend(std::iter::repeat(1.0).take(degree + 1));
    knots
}

fn find_span(knots: &[f64], count: usize, degree: usize, t: f64) -> usize {
    if t >= knots[count] {
        let mut span = count - 1;
        while span > degree && knots[span] >= knots[span + 1] {
            span -= 1;
        }
        return span;
    }
    let mut span = degree;
    while span < count - 1 && knots[span + 1] <= t {
        span += 1;
    }
    span
}

/// de Boor 递推，在齐次坐标中计算以支持权重。
fn de_boor(points: &[Point2], weights: &[f64], knots: &[f64], degree: usize, t: f64) -> Point2 {
    let span = find_span(knots, points.len(), degree, t);
    let mut d: Vec<DVec3> = (0..=degree)
        .map(|j| {
            let index = j + span - degree;
            let w = weights[index];
            DVec3::new(points[index].x() * w, points[index].y() * w, w)
        })
        .collect();

    for r in 1..=degree {
        for j in (r..=degree).rev() {
            let i = j + span - degree;
            let denom = knots[i + degree + 1 - r] - knots[i];
            let alpha = if denom.abs() <= f64::EPSILON {
                0.0
            } else {
                (t - knots[i]) / denom
            };
            d[j] = d[j - 1] * (1.0 - alpha) + d[j] * alpha;
        }
    }

    let h = d[degree];
    Point2::new(h.x / h.z, h.y / h.z)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use fabquote_core::drawing::{Arc, Circle, Line};

    use super::*;

    fn rectangle(width: f64, height: f64, closed: bool) -> Entity {
        Entity::Polyline(Polyline {
            vertices: vec![
                PolylineVertex::new(Point2::new(0.0, 0.0)),
                PolylineVertex::new(Point2::new(width, 0.0)),
                PolylineVertex::new(Point2::new(width, height)),
                PolylineVertex::new(Point2::new(0.0, height)),
            ],
            is_closed: closed,
            layer: "0".to_string(),
        })
    }

    #[test]
    fn closed_polyline_wraps_to_first_vertex() {
        let builder = PathModelBuilder::new();
        let model = builder.build(&[rectangle(10.0, 5.0, true)]).unwrap();
        assert_eq!(model.len(), 4);
        assert!((model.total_length() - 30.0).abs() < 1e-9);

        let open = builder.build(&[rectangle(10.0, 5.0, false)]).unwrap();
        assert_eq!(open.len(), 3);
        assert!((open.total_length() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn positive_bulge_builds_ccw_semicircle() {
        let arc = bulge_arc(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), 1.0).unwrap();
        match arc {
            Path::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                assert!((center.x() - 5.0).abs() < 1e-9);
                assert!(center.y().abs() < 1e-9);
                assert!((radius - 5.0).abs() < 1e-9);
                assert!((start_angle - 180.0).abs() < 1e-9);
                assert!(end_angle.abs() < 1e-9);
            }
            other => panic!("expected arc, got {other:?}"),
        }
        assert!((arc.length() - 5.0 * PI).abs() < 1e-9);
        // 逆时针从 180° 到 360° 经过下方
        assert!((arc.bounds().min().y() + 5.0).abs() < 1e-9);
    }

    #[test]
    fn negative_bulge_bulges_the_other_way() {
        let arc = bulge_arc(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), -1.0).unwrap();
        assert!((arc.bounds().max().y() - 5.0).abs() < 1e-9);
        assert!((arc.length() - 5.0 * PI).abs() < 1e-9);

        let shallow = bulge_arc(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), 0.5).unwrap();
        let expected_sweep = 4.0 * 0.5_f64.atan();
        let expected_radius = 1.0 / (expected_sweep / 2.0).sin();
        assert!((shallow.length() - expected_radius * expected_sweep).abs() < 1e-9);
    }

    #[test]
    fn zero_chord_bulge_falls_back_to_line() {
        let polyline = Entity::Polyline(Polyline {
            vertices: vec![
                PolylineVertex::with_bulge(Point2::new(1.0, 1.0), 0.5),
                PolylineVertex::new(Point2::new(1.0, 1.0)),
                PolylineVertex::new(Point2::new(4.0, 1.0)),
            ],
            is_closed: false,
            layer: "0".to_string(),
        });
        let report = PathModelBuilder::new().build_report(&[polyline]).unwrap();
        assert_eq!(report.model.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::BulgeFallback);
    }

    #[test]
    fn arc_angles_are_normalized() {
        let entity = Entity::Arc(Arc {
            center: Point2::new(0.0, 0.0),
            radius: 1.0,
            start_angle: -90.0,
            end_angle: 450.0,
            layer: "0".to_string(),
        });
        let model = PathModelBuilder::new().build(&[entity]).unwrap();
        let (_, path) = model.iter().next().unwrap();
        match *path {
            Path::Arc {
                start_angle,
                end_angle,
                ..
            } => {
                assert!((start_angle - 270.0).abs() < 1e-9);
                assert!((end_angle - 90.0).abs() < 1e-9);
            }
            other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn full_circle_arc_is_not_collapsed() {
        let entity = Entity::Arc(Arc {
            center: Point2::new(5.0, 5.0),
            radius: 2.0,
            start_angle: 0.0,
            end_angle: 360.0,
            layer: "0".to_string(),
        });
        let model = PathModelBuilder::new().build(&[entity]).unwrap();
        let (_, path) = model.iter().next().unwrap();
        match *path {
            Path::Arc {
                start_angle,
                end_angle,
                ..
            } => {
                assert!(start_angle.abs() < 1e-9);
                assert!((end_angle - 360.0).abs() < 1e-9);
            }
            other => panic!("expected arc, got {other:?}"),
        }
        assert!((path.length() - 4.0 * PI).abs() < 1e-9);
        let bounds = path.bounds();
        assert!((bounds.max().y() - 7.0).abs() < 1e-9);
        assert!((bounds.min().x() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn spline_samples_follow_degree() {
        let spline = Spline {
            degree: 2,
            is_closed: false,
            control_points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(5.0, 10.0),
                Point2::new(10.0, 0.0),
            ],
            knot_values: vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            weights: Vec::new(),
            layer: "0".to_string(),
        };
        let model = PathModelBuilder::new()
            .build(&[Entity::Spline(spline)])
            .unwrap();
        assert_eq!(model.len(), 60);

        let bounds = model.bounds().unwrap();
        assert!(bounds.min().x().abs() < 1e-9);
        assert!((bounds.max().x() - 10.0).abs() < 1e-9);
        // 二次 Bézier 顶点高度为控制点高度的一半
        assert!((bounds.max().y() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn spline_with_inconsistent_knots_uses_clamped_uniform() {
        let spline = Spline {
            degree: 3,
            is_closed: false,
            control_points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 2.0),
                Point2::new(3.0, 2.0),
                Point2::new(4.0, 0.0),
            ],
            knot_values: vec![0.0, 1.0],
            weights: Vec::new(),
            layer: "0".to_string(),
        };
        let model = PathModelBuilder::new()
            .build(&[Entity::Spline(spline)])
            .unwrap();
        assert_eq!(model.len(), 90);
        let bounds = model.bounds().unwrap();
        assert!(bounds.min().x().abs() < 1e-9);
        assert!((bounds.max().x() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_entity_is_skipped_with_warning() {
        let entities = vec![
            Entity::Circle(Circle {
                center: Point2::new(0.0, 0.0),
                radius: f64::NAN,
                layer: "0".to_string(),
            }),
            Entity::Line(Line {
                start: Point2::new(0.0, 0.0),
                end: Point2::new(1.0, 0.0),
                layer: "0".to_string(),
            }),
        ];
        let report = PathModelBuilder::new().build_report(&entities).unwrap();
        assert_eq!(report.model.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::EntitySkipped);
    }

    #[test]
    fn empty_input_is_an_empty_model_error() {
        let result = PathModelBuilder::new().build(&[]);
        assert!(matches!(result, Err(EngineError::EmptyModel)));

        let single = Entity::Polyline(Polyline {
            vertices: vec![PolylineVertex::new(Point2::new(1.0, 1.0))],
            is_closed: true,
            layer: "0".to_string(),
        });
        let result = PathModelBuilder::new().build(&[single]);
        assert!(matches!(result, Err(EngineError::EmptyModel)));
    }
}
