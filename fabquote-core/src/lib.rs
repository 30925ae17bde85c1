pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示，所有图纸坐标均为双精度。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn vector_to(self, other: Point2) -> Vector2 {
            Vector2(other.0 - self.0)
        }

        #[inline]
        pub fn distance_to(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }

        #[inline]
        pub fn midpoint(self, other: Point2) -> Point2 {
            Self((self.0 + other.0) * 0.5)
        }

        #[inline]
        pub fn scale(self, factor: f64) -> Self {
            Self(self.0 * factor)
        }

        #[inline]
        pub fn is_finite(self) -> bool {
            self.0.is_finite()
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 二维向量。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point2, end: Point2) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        #[inline]
        pub fn length_squared(self) -> f64 {
            self.0.length_squared()
        }

        /// 逆时针旋转 90° 得到的左法向。
        #[inline]
        pub fn perp(self) -> Self {
            Self(self.0.perp())
        }

        /// 以度为单位返回向量方向角，范围为 `(-180, 180]`。
        #[inline]
        pub fn angle_degrees(self) -> f64 {
            self.0.y.atan2(self.0.x).to_degrees()
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// 轴对齐边界框，用于估算图纸/路径范围。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: Point2, max: Point2) -> Self {
            Self { min, max }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        #[inline]
        pub fn width(&self) -> f64 {
            if self.is_empty() {
                0.0
            } else {
                self.max.x() - self.min.x()
            }
        }

        #[inline]
        pub fn height(&self) -> f64 {
            if self.is_empty() {
                0.0
            } else {
                self.max.y() - self.min.y()
            }
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        pub fn include_bounds(&mut self, other: &Bounds2D) {
            if other.is_empty() {
                return;
            }
            self.include_point(other.min);
            self.include_point(other.max);
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            debug_assert!(!self.is_empty());
            let center = (self.min.as_vec2() + self.max.as_vec2()) * 0.5;
            Point2::from_vec(center)
        }
    }
}

pub mod diagnostics {
    use std::fmt;

    use serde::{Deserialize, Serialize};

    /// 流水线中可恢复问题的分类。出现这些问题时处理继续进行。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum WarningKind {
        UnsupportedEntity,
        MalformedEntity,
        BulgeFallback,
        EntitySkipped,
        MeasurementFailed,
    }

    impl WarningKind {
        pub fn as_str(self) -> &'static str {
            match self {
                WarningKind::UnsupportedEntity => "unsupported_entity",
                WarningKind::MalformedEntity => "malformed_entity",
                WarningKind::BulgeFallback => "bulge_fallback",
                WarningKind::EntitySkipped => "entity_skipped",
                WarningKind::MeasurementFailed => "measurement_failed",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Warning {
        pub kind: WarningKind,
        pub message: String,
    }

    impl Warning {
        pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
            Self {
                kind,
                message: message.into(),
            }
        }
    }

    impl fmt::Display for Warning {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "[{}] {}", self.kind.as_str(), self.message)
        }
    }
}

pub mod drawing {
    use serde::{Deserialize, Serialize};

    use crate::diagnostics::Warning;
    use crate::geometry::Point2;

    /// 图纸声明的长度单位，来自 HEADER 段的 `$INSUNITS`。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum DrawingUnits {
        Inches,
        Millimeters,
        Unknown(i32),
    }

    impl DrawingUnits {
        pub fn from_insunits(code: i32) -> Self {
            match code {
                1 => DrawingUnits::Inches,
                4 => DrawingUnits::Millimeters,
                other => DrawingUnits::Unknown(other),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum Entity {
        Line(Line),
        Arc(Arc),
        Circle(Circle),
        Polyline(Polyline),
        Spline(Spline),
    }

    impl Entity {
        #[inline]
        pub fn layer_name(&self) -> &str {
            match self {
                Entity::Line(line) => &line.layer,
                Entity::Arc(arc) => &arc.layer,
                Entity::Circle(circle) => &circle.layer,
                Entity::Polyline(polyline) => &polyline.layer,
                Entity::Spline(spline) => &spline.layer,
            }
        }

        /// DXF 中的实体类型名，用于日志与警告。
        pub fn kind_name(&self) -> &'static str {
            match self {
                Entity::Line(_) => "LINE",
                Entity::Arc(_) => "ARC",
                Entity::Circle(_) => "CIRCLE",
                Entity::Polyline(_) => "POLYLINE",
                Entity::Spline(_) => "SPLINE",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Line {
        pub start: Point2,
        pub end: Point2,
        pub layer: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Circle {
        pub center: Point2,
        pub radius: f64,
        pub layer: String,
    }

    /// 圆弧实体，角度保持 DXF 原始的度数，逆时针方向从起始角扫到终止角。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Arc {
        pub center: Point2,
        pub radius: f64,
        pub start_angle: f64,
        pub end_angle: f64,
        pub layer: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Polyline {
        pub vertices: Vec<PolylineVertex>,
        pub is_closed: bool,
        pub layer: String,
    }

    /// 多段线顶点；`bulge` 描述从该顶点到下一个顶点的圆弧曲率，0 表示直线。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PolylineVertex {
        pub position: Point2,
        pub bulge: f64,
    }

    impl PolylineVertex {
        #[inline]
        pub fn new(position: Point2) -> Self {
            Self {
                position,
                bulge: 0.0,
            }
        }

        #[inline]
        pub fn with_bulge(position: Point2, bulge: f64) -> Self {
            Self { position, bulge }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Spline {
        pub degree: i32,
        pub is_closed: bool,
        pub control_points: Vec<Point2>,
        pub knot_values: Vec<f64>,
        pub weights: Vec<f64>,
        pub layer: String,
    }

    /// 解析结果：按文件顺序排列的实体、声明单位以及解析期间的警告。
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Drawing {
        entities: Vec<Entity>,
        declared_units: Option<DrawingUnits>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<Warning>,
    }

    impl Drawing {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn from_entities(entities: Vec<Entity>) -> Self {
            Self {
                entities,
                ..Self::default()
            }
        }

        pub fn push_entity(&mut self, entity: Entity) {
            self.entities.push(entity);
        }

        pub fn push_warning(&mut self, warning: Warning) {
            self.warnings.push(warning);
        }

        pub fn set_declared_units(&mut self, units: DrawingUnits) {
            self.declared_units = Some(units);
        }

        #[inline]
        pub fn declared_units(&self) -> Option<DrawingUnits> {
            self.declared_units
        }

        #[inline]
        pub fn entities(&self) -> &[Entity] {
            &self.entities
        }

        #[inline]
        pub fn warnings(&self) -> &[Warning] {
            &self.warnings
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.entities.is_empty()
        }

        pub fn into_entities(self) -> Vec<Entity> {
            self.entities
        }
    }
}

pub mod path {
    use std::collections::BTreeMap;
    use std::f64::consts::TAU;
    use std::fmt;

    use serde::{Deserialize, Serialize};

    use crate::geometry::{Bounds2D, Point2, Vector2};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub struct PathId(u64);

    impl PathId {
        #[inline]
        pub fn new(raw: u64) -> Self {
            Self(raw)
        }

        /// 提供原始数值，便于序列化或日志输出。
        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    impl fmt::Display for PathId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "path_{}", self.0)
        }
    }

    /// 归一化后的路径图元。圆弧角度以度为单位，位于 `[0, 360)`，逆时针扫掠。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub enum Path {
        Line {
            start: Point2,
            end: Point2,
        },
        Arc {
            center: Point2,
            radius: f64,
            start_angle: f64,
            end_angle: f64,
        },
        Circle {
            center: Point2,
            radius: f64,
        },
    }

    impl Path {
        pub fn line(start: Point2, end: Point2) -> Self {
            Path::Line { start, end }
        }

        /// 角度归一化到 `[0, 360)`；整圈圆弧的终止角记为 `start + 360`。
        pub fn arc(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
            let start = normalize_degrees(start_angle);
            let end = if is_full_turn(start_angle, end_angle) {
                start + 360.0
            } else {
                normalize_degrees(end_angle)
            };
            Path::Arc {
                center,
                radius,
                start_angle: start,
                end_angle: end,
            }
        }

        pub fn circle(center: Point2, radius: f64) -> Self {
            Path::Circle { center, radius }
        }

        pub fn kind_name(&self) -> &'static str {
            match self {
                Path::Line { .. } => "line",
                Path::Arc { .. } => "arc",
                Path::Circle { .. } => "circle",
            }
        }

        /// 所有数值参数有限且半径非负。
        pub fn is_valid(&self) -> bool {
            match *self {
                Path::Line { start, end } => start.is_finite() && end.is_finite(),
                Path::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => {
                    center.is_finite()
                        && radius.is_finite()
                        && radius >= 0.0
                        && start_angle.is_finite()
                        && end_angle.is_finite()
                }
                Path::Circle { center, radius } => {
                    center.is_finite() && radius.is_finite() && radius >= 0.0
                }
            }
        }

        /// 起点与终点；圆没有端点。
        pub fn endpoints(&self) -> Option<(Point2, Point2)> {
            match *self {
                Path::Line { start, end } => Some((start, end)),
                Path::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => Some((
                    point_on_circle(center, radius, start_angle),
                    point_on_circle(center, radius, end_angle),
                )),
                Path::Circle { .. } => None,
            }
        }

        /// 路径真实长度：线段距离、`r × 弧度`、`2πr`。
        pub fn length(&self) -> f64 {
            match *self {
                Path::Line { start, end } => start.distance_to(end),
                Path::Arc {
                    radius,
                    start_angle,
                    end_angle,
                    ..
                } => radius * sweep_degrees(start_angle, end_angle).to_radians(),
                Path::Circle { radius, .. } => TAU * radius,
            }
        }

        /// 轴对齐范围，圆弧/圆包含真实的象限极值点。
        pub fn bounds(&self) -> Bounds2D {
            let mut bounds = Bounds2D::empty();
            match *self {
                Path::Line { start, end } => {
                    bounds.include_point(start);
                    bounds.include_point(end);
                }
                Path::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => arc_bounds(center, radius, start_angle, end_angle, &mut bounds),
                Path::Circle { center, radius } => {
                    let radius = radius.abs();
                    bounds.include_point(Point2::new(center.x() - radius, center.y() - radius));
                    bounds.include_point(Point2::new(center.x() + radius, center.y() + radius));
                }
            }
            bounds
        }

        /// 按比例缩放所有坐标与半径（角度不变）。
        pub fn scaled(&self, factor: f64) -> Path {
            match *self {
                Path::Line { start, end } => Path::Line {
                    start: start.scale(factor),
                    end: end.scale(factor),
                },
                Path::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => Path::Arc {
                    center: center.scale(factor),
                    radius: radius * factor,
                    start_angle,
                    end_angle,
                },
                Path::Circle { center, radius } => Path::Circle {
                    center: center.scale(factor),
                    radius: radius * factor,
                },
            }
        }
    }

    /// 将角度归一化到 `[0, 360)`。
    pub fn normalize_degrees(angle: f64) -> f64 {
        let result = angle.rem_euclid(360.0);
        if result >= 360.0 { 0.0 } else { result }
    }

    /// 从起始角逆时针扫到终止角的角度；终止角小于起始角时补 360°。
    /// 两角完全相等时为 0，相差 360° 的非零整数倍时为整圈 360。
    pub fn sweep_degrees(start_angle: f64, end_angle: f64) -> f64 {
        if is_full_turn(start_angle, end_angle) {
            return 360.0;
        }
        let start = normalize_degrees(start_angle);
        let end = normalize_degrees(end_angle);
        let sweep = end - start;
        if sweep < 0.0 { sweep + 360.0 } else { sweep }
    }

    fn is_full_turn(start_angle: f64, end_angle: f64) -> bool {
        const FULL_TURN_EPSILON: f64 = 1e-9;
        let diff = end_angle - start_angle;
        let turns = (diff / 360.0).round();
        turns != 0.0 && (diff - turns * 360.0).abs() <= FULL_TURN_EPSILON
    }

    pub fn point_on_circle(center: Point2, radius: f64, angle_degrees: f64) -> Point2 {
        let angle = angle_degrees.to_radians();
        center.translate(Vector2::new(radius * angle.cos(), radius * angle.sin()))
    }

    fn arc_bounds(
        center: Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        bounds: &mut Bounds2D,
    ) {
        let radius = radius.abs();
        if radius <= f64::EPSILON {
            bounds.include_point(center);
            return;
        }

        let start = normalize_degrees(start_angle);
        let end = start + sweep_degrees(start_angle, end_angle);
        bounds.include_point(point_on_circle(center, radius, start));
        bounds.include_point(point_on_circle(center, radius, end));

        const QUADRANTS: [f64; 4] = [0.0, 90.0, 180.0, 270.0];
        for base in QUADRANTS {
            let mut candidate = base;
            while candidate < start {
                candidate += 360.0;
            }
            if candidate <= end {
                bounds.include_point(point_on_circle(center, radius, candidate));
            }
        }
    }

    /// 以生成的 ID 为键的路径集合。迭代顺序只由 ID 决定，下游不依赖插入顺序。
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct PathModel {
        paths: BTreeMap<PathId, Path>,
        next_path_id: u64,
    }

    impl PathModel {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, path: Path) -> PathId {
            let id = self.next_id();
            self.paths.insert(id, path);
            id
        }

        #[inline]
        pub fn get(&self, id: PathId) -> Option<&Path> {
            self.paths.get(&id)
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.paths.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.paths.is_empty()
        }

        pub fn iter(&self) -> impl Iterator<Item = (PathId, &Path)> {
            self.paths.iter().map(|(id, path)| (*id, path))
        }

        pub fn paths(&self) -> impl Iterator<Item = &Path> {
            self.paths.values()
        }

        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            for path in self.paths.values() {
                bounds.include_bounds(&path.bounds());
            }
            if bounds.is_empty() { None } else { Some(bounds) }
        }

        pub fn total_length(&self) -> f64 {
            self.paths.values().map(Path::length).sum()
        }

        pub fn circle_count(&self) -> usize {
            self.paths
                .values()
                .filter(|path| matches!(path, Path::Circle { .. }))
                .count()
        }

        /// 返回所有坐标乘以 `factor` 的新模型，保持原有 ID。
        pub fn scaled(&self, factor: f64) -> PathModel {
            PathModel {
                paths: self
                    .paths
                    .iter()
                    .map(|(id, path)| (*id, path.scaled(factor)))
                    .collect(),
                next_path_id: self.next_path_id,
            }
        }

        #[inline]
        fn next_id(&mut self) -> PathId {
            let id = self.next_path_id;
            self.next_path_id += 1;
            PathId(id)
        }
    }

    impl FromIterator<Path> for PathModel {
        fn from_iter<I: IntoIterator<Item = Path>>(iter: I) -> Self {
            let mut model = PathModel::new();
            for path in iter {
                model.insert(path);
            }
            model
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::f64::consts::PI;

        #[test]
        fn sweep_wraps_when_end_precedes_start() {
            assert!((sweep_degrees(270.0, 90.0) - 180.0).abs() < 1e-9);
            assert!((sweep_degrees(0.0, 90.0) - 90.0).abs() < 1e-9);
            assert!((sweep_degrees(-90.0, 90.0) - 180.0).abs() < 1e-9);
            assert!(sweep_degrees(45.0, 45.0).abs() < 1e-9);
        }

        #[test]
        fn whole_turn_difference_is_a_full_sweep() {
            assert!((sweep_degrees(0.0, 360.0) - 360.0).abs() < 1e-9);
            assert!((sweep_degrees(-90.0, 270.0) - 360.0).abs() < 1e-9);
            assert!((sweep_degrees(30.0, 750.0) - 360.0).abs() < 1e-9);
            assert!((sweep_degrees(360.0, 0.0) - 360.0).abs() < 1e-9);

            let arc = Path::arc(Point2::new(5.0, 5.0), 2.0, 0.0, 360.0);
            assert!((arc.length() - 4.0 * PI).abs() < 1e-9);
            let bounds = arc.bounds();
            assert!((bounds.min().x() - 3.0).abs() < 1e-9);
            assert!((bounds.min().y() - 3.0).abs() < 1e-9);
            assert!((bounds.max().x() - 7.0).abs() < 1e-9);
            assert!((bounds.max().y() - 7.0).abs() < 1e-9);
            let (start, end) = arc.endpoints().unwrap();
            assert!(start.distance_to(end) < 1e-9);
        }

        #[test]
        fn arc_bounds_include_quadrant_extremes() {
            let arc = Path::arc(Point2::new(0.0, 0.0), 2.0, 45.0, 135.0);
            let bounds = arc.bounds();
            assert!((bounds.max().y() - 2.0).abs() < 1e-9);
            let half = 2.0 * (PI / 4.0).cos();
            assert!((bounds.min().x() + half).abs() < 1e-9);
            assert!((bounds.max().x() - half).abs() < 1e-9);

            let wrapped = Path::arc(Point2::new(0.0, 0.0), 1.0, 270.0, 90.0);
            let bounds = wrapped.bounds();
            assert!((bounds.max().x() - 1.0).abs() < 1e-9);
            assert!((bounds.min().y() + 1.0).abs() < 1e-9);
            assert!((bounds.max().y() - 1.0).abs() < 1e-9);
            assert!(bounds.min().x().abs() < 1e-9);
        }

        #[test]
        fn path_lengths_follow_geometry() {
            let line = Path::line(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
            assert!((line.length() - 5.0).abs() < 1e-12);
            let arc = Path::arc(Point2::new(1.0, 1.0), 2.0, 0.0, 90.0);
            assert!((arc.length() - PI).abs() < 1e-12);
            let circle = Path::circle(Point2::new(0.0, 0.0), 1.5);
            assert!((circle.length() - 3.0 * PI).abs() < 1e-12);
        }

        #[test]
        fn model_iterates_by_id() {
            let model: PathModel = [
                Path::circle(Point2::new(0.0, 0.0), 1.0),
                Path::line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
            ]
            .into_iter()
            .collect();
            let ids: Vec<u64> = model.iter().map(|(id, _)| id.get()).collect();
            assert_eq!(ids, vec![0, 1]);
            assert_eq!(model.circle_count(), 1);
            assert_eq!(model.get(PathId::new(1)).map(Path::kind_name), Some("line"));
        }

        #[test]
        fn invalid_paths_are_detected() {
            assert!(!Path::circle(Point2::new(0.0, 0.0), -1.0).is_valid());
            assert!(!Path::line(Point2::new(f64::NAN, 0.0), Point2::new(1.0, 0.0)).is_valid());
            assert!(Path::arc(Point2::new(0.0, 0.0), 1.0, 10.0, 20.0).is_valid());
        }
    }
}

pub mod measurement {
    use serde::{Deserialize, Serialize};

    /// 零件测量结果，长度单位为英寸（经单位推断换算后）。
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct Measurement {
        pub width: f64,
        pub height: f64,
        pub area: f64,
        pub total_edge_length: f64,
        pub hole_count: u32,
    }

    impl Measurement {
        #[inline]
        pub fn zero() -> Self {
            Self::default()
        }

        #[inline]
        pub fn is_zero(&self) -> bool {
            *self == Self::zero()
        }
    }
}
