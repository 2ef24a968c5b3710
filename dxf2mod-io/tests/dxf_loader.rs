mod golden;

use std::path::PathBuf;

use dxf2mod_core::{document::Entity, geometry::Point2};
use dxf2mod_io::{DocumentLoader, DxfFacade, IoError};
use golden::assert_golden;

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/data");
    path.push(name);
    path
}

#[test]
fn load_square_matches_expected_document() {
    let loader = DxfFacade::new();
    let doc = loader.load(&fixture("square.dxf")).expect("读取 DXF 失败");
    assert_golden("square", &doc);
}

#[test]
fn load_slot_with_arcs_keeps_degrees() {
    let loader = DxfFacade::new();
    let doc = loader.load(&fixture("slot.dxf")).expect("读取带圆弧的 DXF 失败");
    assert_golden("slot", &doc);

    let mut arcs = doc.entities().filter_map(|(_, entity)| match entity {
        Entity::Arc(arc) => Some(arc),
        _ => None,
    });
    let cap = arcs.next().expect("未找到圆弧实体");
    assert!((cap.center.x() - 4.0).abs() < 1e-9);
    assert!((cap.start_angle - 270.0).abs() < 1e-9);
    assert!((cap.end_angle - 90.0).abs() < 1e-9);
    assert_eq!(arcs.count(), 2);
}

#[test]
fn blocks_section_entities_are_not_loaded() {
    let loader = DxfFacade::new();
    let doc = loader.load(&fixture("square.dxf")).expect("读取 DXF 失败");
    assert_eq!(doc.entities().count(), 4);
    assert!(doc.entities().all(|(_, entity)| entity.layer_name() == "F.SilkS"));
}

#[test]
fn unsupported_entities_are_passed_through() {
    let loader = DxfFacade::new();
    let doc = loader
        .load(&fixture("unsupported.dxf"))
        .expect("读取含不支持实体的 DXF 失败");

    let kinds: Vec<_> = doc
        .entities()
        .map(|(_, entity)| (entity.kind(), entity.layer_name()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("LINE", "F.SilkS"),
            ("CIRCLE", "F.SilkS"),
            ("LWPOLYLINE", "F.Fab"),
        ]
    );
    match doc.entities().next().map(|(_, entity)| entity) {
        Some(Entity::Line(line)) => assert_eq!(line.end, Point2::new(10.0, 0.0)),
        other => panic!("expected line, got {other:?}"),
    }
}

#[test]
fn missing_file_is_a_read_error() {
    let loader = DxfFacade::new();
    match loader.load(&fixture("does_not_exist.dxf")) {
        Err(IoError::ReadError { path, .. }) => assert!(path.ends_with("does_not_exist.dxf")),
        other => panic!("expected read error, got {other:?}"),
    }
}

#[test]
fn codepage_bytes_in_skipped_entities_are_tolerated() {
    let raw = std::fs::read(fixture("codepage_text.dxf")).expect("读取夹具失败");
    assert!(std::str::from_utf8(&raw).is_err());

    let doc = DxfFacade::new()
        .load(&fixture("codepage_text.dxf"))
        .expect("读取含代码页字节的 DXF 失败");
    let kinds: Vec<_> = doc.entities().map(|(_, entity)| entity.kind()).collect();
    assert_eq!(kinds, vec!["LINE", "TEXT"]);
    match doc.entities().next().map(|(_, entity)| entity) {
        Some(Entity::Line(line)) => assert_eq!(line.end, Point2::new(10.0, 0.0)),
        other => panic!("expected line, got {other:?}"),
    }
}
