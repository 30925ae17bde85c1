use std::f64::consts::PI;

use fabquote_engine::{
    builder::PathModelBuilder,
    errors::EngineError,
    measure::GeometryMeasurer,
    pricing::{RateTable, Selection, price},
};

fn dxf(entities: &str) -> String {
    format!("0\nSECTION\n2\nENTITIES\n{entities}0\nENDSEC\n0\nEOF\n")
}

fn lwpolyline_rectangle(width: f64, height: f64) -> String {
    format!(
        "0\nLWPOLYLINE\n8\n0\n90\n4\n70\n1\n10\n0.0\n20\n0.0\n10\n{width}\n20\n0.0\n10\n{width}\n20\n{height}\n10\n0.0\n20\n{height}\n"
    )
}

fn circle(x: f64, y: f64, r: f64) -> String {
    format!("0\nCIRCLE\n8\nHOLES\n10\n{x}\n20\n{y}\n40\n{r}\n")
}

#[test]
fn rectangle_plate_with_holes_prices_seven_dollars() {
    let mut body = lwpolyline_rectangle(10.0, 5.0);
    for (x, y) in [(1.0, 1.0), (9.0, 1.0), (1.0, 4.0), (9.0, 4.0)] {
        body.push_str(&circle(x, y, 0.125));
    }
    let drawing = fabquote_io::parse(&dxf(&body)).expect("解析失败");
    let model = PathModelBuilder::new()
        .build(drawing.entities())
        .expect("构建路径模型失败");
    let measurement = GeometryMeasurer::new().measure(&model);

    assert!((measurement.area - 50.0).abs() < 1e-6);
    assert_eq!(measurement.hole_count, 4);
    let expected_length = 30.0 + 4.0 * 2.0 * PI * 0.125;
    assert!((measurement.total_edge_length - expected_length).abs() < 1e-6);

    let rates = RateTable::default_schedule();
    let plain = price(
        Some(&measurement),
        Some(&rates),
        &Selection::new("Mild Steel", "0.048\""),
    );
    assert_eq!(plain.total_cents(), 500);

    let countersunk = price(
        Some(&measurement),
        Some(&rates),
        &Selection::new("Mild Steel", "0.048\"").with_service("Countersinking"),
    );
    assert_eq!(countersunk.total_cents(), 700);
}

#[test]
fn full_circle_arc_counts_toward_size_and_price() {
    let body = "0\nLINE\n8\n0\n10\n0.0\n20\n0.0\n11\n10.0\n21\n0.0\n\
                0\nARC\n8\n0\n10\n5.0\n20\n5.0\n40\n2.0\n50\n0.0\n51\n360.0\n";
    let drawing = fabquote_io::parse(&dxf(body)).expect("解析失败");
    let model = PathModelBuilder::new()
        .build(drawing.entities())
        .expect("构建路径模型失败");
    let measurement = GeometryMeasurer::new().measure(&model);

    assert!((measurement.width - 10.0).abs() < 1e-9);
    assert!((measurement.height - 7.0).abs() < 1e-9);
    assert!((measurement.total_edge_length - (10.0 + 4.0 * PI)).abs() < 1e-9);

    let quote = price(
        Some(&measurement),
        Some(&RateTable::default_schedule()),
        &Selection::new("Mild Steel", "0.048\""),
    );
    assert_eq!(quote.total_cents(), 700);
}

#[test]
fn millimetre_drawing_measures_in_inches() {
    let body = lwpolyline_rectangle(254.0, 127.0);
    let drawing = fabquote_io::parse(&dxf(&body)).expect("解析失败");
    let model = PathModelBuilder::new().build(drawing.entities()).unwrap();
    let measurement = GeometryMeasurer::new().measure(&model);
    assert!((measurement.width - 10.0).abs() < 1e-6);
    assert!((measurement.height - 5.0).abs() < 1e-6);
    assert!((measurement.total_edge_length - 30.0).abs() < 1e-6);
}

#[test]
fn drawing_with_only_unsupported_entities_is_empty() {
    let body = "0\nTEXT\n8\n0\n10\n0.0\n20\n0.0\n1\nhello\n";
    let drawing = fabquote_io::parse(&dxf(body)).expect("解析失败");
    assert_eq!(drawing.warnings().len(), 1);
    let result = PathModelBuilder::new().build(drawing.entities());
    assert!(matches!(result, Err(EngineError::EmptyModel)));
}

#[test]
fn truncated_entity_never_reaches_measurement() {
    let text = "0\nSECTION\n2\nENTITIES\n0\nCIRCLE\n10\n1.0\n20\n";
    let err = fabquote_io::parse(text).expect_err("截断文件应失败");
    assert!(err.is_format());
}
