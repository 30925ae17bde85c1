use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;

use fabquote_core::drawing::{Drawing, Entity, PolylineVertex};
use fabquote_core::geometry::Point2;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GoldenDrawing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    units: Option<String>,
    entities: Vec<GoldenEntity>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct GoldenEntity {
    index: usize,
    kind: String,
    layer: String,
    data: Value,
}

pub fn assert_golden(name: &str, drawing: &Drawing) {
    let snapshot = GoldenDrawing::from_drawing(drawing);
    let base_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/golden");
    if let Err(err) = fs::create_dir_all(&base_dir) {
        panic!("无法创建黄金数据目录 {}: {err}", base_dir.display());
    }
    let golden_path = base_dir.join(format!("{name}.json"));
    let serialized = serde_json::to_string_pretty(&snapshot).expect("序列化黄金快照失败");

    if !golden_path.exists() {
        fs::write(&golden_path, &serialized)
            .unwrap_or_else(|err| panic!("写入黄金文件 {} 失败: {err}", golden_path.display()));
        panic!(
            "黄金文件 {} 不存在，已自动生成。请确认内容后重新运行测试。",
            golden_path.display()
        );
    }

    let expected_str = fs::read_to_string(&golden_path)
        .unwrap_or_else(|err| panic!("读取黄金文件 {} 失败: {err}", golden_path.display()));
    let expected: GoldenDrawing = serde_json::from_str(&expected_str)
        .unwrap_or_else(|err| panic!("解析黄金文件 {} 失败: {err}", golden_path.display()));

    if expected != snapshot {
        let diff_path = base_dir.join(format!("{name}.actual.json"));
        fs::write(&diff_path, &serialized).expect("写入差异文件失败");
        panic!(
            "黄金文件 {} 与当前解析结果不一致。已生成对照输出 {}。",
            golden_path.display(),
            diff_path.display()
        );
    }
}

impl GoldenDrawing {
    fn from_drawing(drawing: &Drawing) -> Self {
        let entities = drawing
            .entities()
            .iter()
            .enumerate()
            .map(|(index, entity)| GoldenEntity {
                index,
                kind: entity.kind_name().to_string(),
                layer: entity.layer_name().to_string(),
                data: entity_payload(entity),
            })
            .collect();

        Self {
            units: drawing.declared_units().map(|units| format!("{units:?}")),
            entities,
            warnings: drawing
                .warnings()
                .iter()
                .map(|warning| warning.kind.as_str().to_string())
                .collect(),
        }
    }
}

fn entity_payload(entity: &Entity) -> Value {
    match entity {
        Entity::Line(line) => json!({
            "start": point_to_array(line.start),
            "end": point_to_array(line.end),
        }),
        Entity::Circle(circle) => json!({
            "center": point_to_array(circle.center),
            "radius": circle.radius,
        }),
        Entity::Arc(arc) => json!({
            "center": point_to_array(arc.center),
            "radius": arc.radius,
            "start_angle": arc.start_angle,
            "end_angle": arc.end_angle,
        }),
        Entity::Polyline(polyline) => json!({
            "is_closed": polyline.is_closed,
            "vertices": polyline.vertices.iter().map(vertex_to_value).collect::<Vec<_>>(),
        }),
        Entity::Spline(spline) => json!({
            "degree": spline.degree,
            "is_closed": spline.is_closed,
            "control_points": spline
                .control_points
                .iter()
                .map(|point| point_to_array(*point))
                .collect::<Vec<_>>(),
            "knot_values": spline.knot_values,
            "weights": spline.weights,
        }),
    }
}

fn vertex_to_value(vertex: &PolylineVertex) -> Value {
    json!({
        "position": point_to_array(vertex.position),
        "bulge": vertex.bulge,
    })
}

fn point_to_array(point: Point2) -> [f64; 2] {
    [point.x(), point.y()]
}
