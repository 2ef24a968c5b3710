use dxf2mod_core::document::{Document, Entity};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GoldenDocument {
    layers: Vec<String>,
    entities: Vec<GoldenEntity>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct GoldenEntity {
    id: u64,
    kind: String,
    layer: String,
    data: Value,
}

pub fn assert_golden(name: &str, document: &Document) {
    let snapshot = GoldenDocument::from_document(document);
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
    let expected: GoldenDocument = serde_json::from_str(&expected_str)
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

impl GoldenDocument {
    fn from_document(document: &Document) -> Self {
        let layers = document.layers().map(|layer| layer.name.clone()).collect();
        let entities = document
            .entities()
            .map(|(id, entity)| GoldenEntity {
                id: id.get(),
                kind: entity.kind().to_string(),
                layer: entity.layer_name().to_string(),
                data: entity_payload(entity),
            })
            .collect();
        Self { layers, entities }
    }
}

fn entity_payload(entity: &Entity) -> Value {
    match entity {
        Entity::Line(line) => json!({
            "start": [line.start.x(), line.start.y()],
            "end": [line.end.x(), line.end.y()],
        }),
        Entity::Arc(arc) => json!({
            "center": [arc.center.x(), arc.center.y()],
            "radius": arc.radius,
            "start_angle": arc.start_angle,
            "end_angle": arc.end_angle,
        }),
        Entity::Unsupported(_) => Value::Null,
    }
}
