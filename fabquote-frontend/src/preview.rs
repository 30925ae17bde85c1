use std::f64::consts::TAU;
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fabquote_config::PreviewConfig;
use fabquote_core::{
    geometry::Point2,
    path::{Path, PathModel, sweep_degrees},
};
use glam::DVec2;
use tracing::{debug, info};

const MIN_CIRCLE_SEGMENTS: usize = 12;
const MIN_ARC_SEGMENTS: usize = 6;
/// 每段弦长约为精度的 5 倍。
const SEGMENT_LENGTH_FACTOR: f64 = 5.0;

#[derive(Debug, Clone, Copy)]
pub struct PreviewOptions {
    pub accuracy: f64,
    pub padding_ratio: f64,
}

impl PreviewOptions {
    pub fn from_config(config: &PreviewConfig) -> Self {
        Self {
            accuracy: config.accuracy,
            padding_ratio: config.padding_ratio,
        }
    }
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self::from_config(&PreviewConfig::default())
    }
}

/// 正交投影范围，以零件中心为原点。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Extents {
    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }
}

/// 折线段顶点对，坐标已平移到包围盒中心。
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewScene {
    segments: Vec<[Point2; 2]>,
    extents: Extents,
    center: Point2,
}

impl PreviewScene {
    pub fn from_model(model: &PathModel, options: &PreviewOptions) -> Option<Self> {
        let bounds = model.bounds()?;
        let center = bounds.center();
        let offset = center.as_vec2();

        let mut segments = Vec::new();
        for (_, path) in model.iter() {
            let points = tessellate(path, options.accuracy);
            segments.extend(points.windows(2).map(|pair| {
                [
                    Point2::from_vec(pair[0] - offset),
                    Point2::from_vec(pair[1] - offset),
                ]
            }));
        }

        let max_dim = bounds.width().max(bounds.height());
        let max_dim = if max_dim > 0.0 { max_dim } else { 1.0 };
        let pad = max_dim * options.padding_ratio;
        let half_w = bounds.width() / 2.0 + pad;
        let half_h = bounds.height() / 2.0 + pad;
        let extents = Extents {
            left: -half_w,
            right: half_w,
            bottom: -half_h,
            top: half_h,
        };

        debug!(segments = segments.len(), paths = model.len(), "预览几何生成完成");
        Some(Self {
            segments,
            extents,
            center,
        })
    }

    #[inline]
    pub fn segments(&self) -> &[[Point2; 2]] {
        &self.segments
    }

    #[inline]
    pub fn extents(&self) -> Extents {
        self.extents
    }

    /// 原始坐标系中的包围盒中心。
    #[inline]
    pub fn center(&self) -> Point2 {
        self.center
    }

    /// 展平为 `x, y, z` 顶点缓冲，z 恒为 0。
    pub fn vertex_buffer(&self) -> Vec<f32> {
        self.segments
            .iter()
            .flat_map(|[a, b]| [a.x() as f32, a.y() as f32, 0.0, b.x() as f32, b.y() as f32, 0.0])
            .collect()
    }

    pub fn to_svg(&self) -> String {
        let e = self.extents;
        let stroke = (e.width().max(e.height()) / 500.0).max(f64::EPSILON);
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{:.4} {:.4} {:.4} {:.4}">"#,
            e.left,
            -e.top,
            e.width(),
            e.height()
        );
        let _ = writeln!(
            out,
            r#"  <g transform="scale(1,-1)" fill="none" stroke="black" stroke-width="{stroke:.4}">"#
        );
        let mut d = String::new();
        for [a, b] in &self.segments {
            let _ = write!(d, "M{:.4} {:.4}L{:.4} {:.4}", a.x(), a.y(), b.x(), b.y());
        }
        let _ = writeln!(out, r#"    <path d="{d}"/>"#);
        out.push_str("  </g>\n</svg>\n");
        out
    }
}

fn tessellate(path: &Path, accuracy: f64) -> Vec<DVec2> {
    let chord = accuracy * SEGMENT_LENGTH_FACTOR;
    match *path {
        Path::Line { start, end } => vec![start.as_vec2(), end.as_vec2()],
        Path::Circle { center, radius } => {
            let count = segment_count(radius * std::f64::consts::PI / chord, MIN_CIRCLE_SEGMENTS);
            sample_arc(center, radius, 0.0, TAU, count)
        }
        Path::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => {
            let sweep = sweep_degrees(start_angle, end_angle).to_radians();
            let count = segment_count(radius * sweep / chord, MIN_ARC_SEGMENTS);
            sample_arc(center, radius, start_angle.to_radians(), sweep, count)
        }
    }
}

fn segment_count(raw: f64, minimum: usize) -> usize {
    if raw.is_finite() && raw > 0.0 {
        (raw.ceil() as usize).max(minimum)
    } else {
        minimum
    }
}

fn sample_arc(center: Point2, radius: f64, start: f64, sweep: f64, count: usize) -> Vec<DVec2> {
    (0..=count)
        .map(|i| {
            let angle = start + sweep * i as f64 / count as f64;
            center.as_vec2() + DVec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// 预览所占用的显示缓冲。释放（含出错路径上的提前释放）通过 `Drop` 完成。
#[derive(Debug)]
pub struct PreviewSurface {
    id: u64,
    file_tag: String,
    vertices: Vec<f32>,
    extents: Extents,
    live: Arc<AtomicUsize>,
}

impl PreviewSurface {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn file_tag(&self) -> &str {
        &self.file_tag
    }

    #[inline]
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    #[inline]
    pub fn extents(&self) -> Extents {
        self.extents
    }
}

impl Drop for PreviewSurface {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        debug!(surface = self.id, file = %self.file_tag, "释放预览缓冲");
    }
}

/// 至多持有一个预览缓冲；切换文件时先释放旧缓冲。
#[derive(Debug, Default)]
pub struct PreviewHost {
    surface: Option<PreviewSurface>,
    live: Arc<AtomicUsize>,
    next_id: u64,
}

impl PreviewHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, file_tag: impl Into<String>, scene: &PreviewScene) -> &PreviewSurface {
        self.release();
        self.next_id += 1;
        self.live.fetch_add(1, Ordering::SeqCst);
        let surface = PreviewSurface {
            id: self.next_id,
            file_tag: file_tag.into(),
            vertices: scene.vertex_buffer(),
            extents: scene.extents(),
            live: Arc::clone(&self.live),
        };
        info!(
            surface = surface.id,
            file = %surface.file_tag,
            vertices = surface.vertices.len() / 3,
            "预览已更新"
        );
        self.surface.insert(surface)
    }

    /// 先释放旧缓冲，再尝试构建新场景；构建失败时不保留任何缓冲。
    pub fn show_with<E>(
        &mut self,
        file_tag: impl Into<String>,
        build: impl FnOnce() -> Result<PreviewScene, E>,
    ) -> Result<&PreviewSurface, E> {
        self.release();
        let scene = build()?;
        Ok(self.show(file_tag, &scene))
    }

    pub fn release(&mut self) {
        self.surface = None;
    }

    #[inline]
    pub fn current(&self) -> Option<&PreviewSurface> {
        self.surface.as_ref()
    }

    /// 尚未释放的缓冲数量。
    #[inline]
    pub fn live_surfaces(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}
