use std::fs;
use std::path::Path;

use dxf2mod_core::{
    document::{Arc, Document, Entity, Footprint, Line, UnsupportedEntity},
    geometry::Point2,
};
use thiserror::Error;

pub mod kicad_mod;

pub use kicad_mod::KicadModFacade;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

pub trait FootprintSaver {
    fn render(&self, footprint: &Footprint) -> String;

    fn save(&self, footprint: &Footprint, path: &Path) -> Result<(), IoError> {
        fs::write(path, self.render(footprint)).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// ASCII DXF 读取器，仅解析 ENTITIES 段中的 LINE 与 ARC。
#[derive(Debug, Default, Clone, Copy)]
pub struct DxfFacade;

impl DxfFacade {
    pub fn new() -> Self {
        Self
    }

    /// 直接解析内存中的 DXF 文本。
    pub fn parse_str(&self, source: &str) -> Result<Document, IoError> {
        DxfParser::new(source)
            .parse()
            .map_err(|DxfError { message }| IoError::InvalidDocument(message))
    }
}

impl DocumentLoader for DxfFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        let bytes = fs::read(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        // 旧版 DXF 按代码页编码，只有组码、数值与图层名参与解析
        self.parse_str(&String::from_utf8_lossy(&bytes))
    }
}

#[derive(Debug)]
struct DxfError {
    message: String,
}

impl DxfError {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

struct DxfParser<'a> {
    reader: DxfReader<'a>,
}

impl<'a> DxfParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            reader: DxfReader::new(source),
        }
    }

    fn parse(mut self) -> Result<Document, DxfError> {
        let mut document = Document::new();
        while let Some((code, value)) = self.reader.next_pair()? {
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
                        "ENTITIES" => self.parse_entities(&mut document)?,
                        _ => self.skip_section()?,
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
        Ok(document)
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

    fn parse_entities(&mut self, document: &mut Document) -> Result<(), DxfError> {
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

            match value.trim() {
                "ENDSEC" => break,
                "SEQEND" => self.skip_entity_body()?,
                kind => {
                    let entity = self.parse_entity(kind)?;
                    document.add_entity(entity);
                }
            }
        }
        Ok(())
    }

    fn parse_entity(&mut self, kind: &str) -> Result<Entity, DxfError> {
        match kind {
            "LINE" => self.parse_line(),
            "ARC" => self.parse_arc(),
            other => self.parse_unsupported(other),
        }
    }

    fn parse_line(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut start_x = None;
        let mut start_y = None;
        let mut end_x = None;
        let mut end_y = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value))?;
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    10 => assign_coord(&mut start_x, &value, "LINE 起点 X（组码 10）")?,
                    20 => assign_coord(&mut start_y, &value, "LINE 起点 Y（组码 20）")?,
                    11 => assign_coord(&mut end_x, &value, "LINE 终点 X（组码 11）")?,
                    21 => assign_coord(&mut end_y, &value, "LINE 终点 Y（组码 21）")?,
                    30 | 31 => {} // 忽略 Z 坐标
                    _ => {}
                },
                None => return Err(DxfError::invalid("LINE 未正确结束")),
            }
        }

        let layer = layer.unwrap_or_else(|| "0".to_string());
        let sx = start_x.ok_or_else(|| DxfError::invalid("LINE 缺少起点 X（组码 10）"))?;
        let sy = start_y.ok_or_else(|| DxfError::invalid("LINE 缺少起点 Y（组码 20）"))?;
        let ex = end_x.ok_or_else(|| DxfError::invalid("LINE 缺少终点 X（组码 11）"))?;
        let ey = end_y.ok_or_else(|| DxfError::invalid("LINE 缺少终点 Y（组码 21）"))?;

        Ok(Entity::Line(Line {
            start: Point2::new(sx, sy),
            end: Point2::new(ex, ey),
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
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value))?;
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    10 => assign_coord(&mut center_x, &value, "ARC 圆心 X（组码 10）")?,
                    20 => assign_coord(&mut center_y, &value, "ARC 圆心 Y（组码 20）")?,
                    40 => assign_coord(&mut radius, &value, "ARC 半径（组码 40）")?,
                    50 => assign_coord(&mut start_angle, &value, "ARC 起始角（组码 50）")?,
                    51 => assign_coord(&mut end_angle, &value, "ARC 终止角（组码 51）")?,
                    30 => {}
                    _ => {}
                },
                None => return Err(DxfError::invalid("ARC 未正确结束")),
            }
        }

        let layer = layer.unwrap_or_else(|| "0".to_string());
        let cx = center_x.ok_or_else(|| DxfError::invalid("ARC 缺少圆心 X（组码 10）"))?;
        let cy = center_y.ok_or_else(|| DxfError::invalid("ARC 缺少圆心 Y（组码 20）"))?;
        let radius = radius.ok_or_else(|| DxfError::invalid("ARC 缺少半径（组码 40）"))?;
        let start_angle =
            start_angle.ok_or_else(|| DxfError::invalid("ARC 缺少起始角（组码 50）"))?;
        let end_angle = end_angle.ok_or_else(|| DxfError::invalid("ARC 缺少终止角（组码 51）"))?;

        Ok(Entity::Arc(Arc {
            center: Point2::new(cx, cy),
            radius,
            start_angle,
            end_angle,
            layer,
        }))
    }

    /// 其他实体只记录类型与图层，是否报错由拼接阶段决定。
    fn parse_unsupported(&mut self, kind: &str) -> Result<Entity, DxfError> {
        let mut layer = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value))?;
                    break;
                }
                Some((8, value)) => layer = Some(value.trim().to_string()),
                Some(_) => continue,
                None => return Err(DxfError::invalid(format!("{kind} 未正确结束"))),
            }
        }
        Ok(Entity::Unsupported(UnsupportedEntity {
            kind: kind.to_string(),
            layer: layer.unwrap_or_else(|| "0".to_string()),
        }))
    }

    fn skip_entity_body(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value))?;
                    break;
                }
                Some(_) => continue,
                None => break,
            }
        }
        Ok(())
    }
}

const COMMENT_CODE: i32 = 999;

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

    /// 读取下一个组码/值对，跳过 999 注释。
    fn next_pair(&mut self) -> Result<Option<(i32, String)>, DxfError> {
        if let Some(pair) = self.buffer.take() {
            return Ok(Some(pair));
        }
        loop {
            match self.read_pair()? {
                Some((COMMENT_CODE, _)) => continue,
                other => return Ok(other),
            }
        }
    }

    fn read_pair(&mut self) -> Result<Option<(i32, String)>, DxfError> {
        let code_line = match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                line
            }
            None => return Ok(None),
        };
        // 文件末尾的空行不算作组码
        if code_line.trim().is_empty() && self.lines.clone().all(|line| line.trim().is_empty()) {
            return Ok(None);
        }

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

    fn put_back(&mut self, pair: (i32, String)) -> Result<(), DxfError> {
        if self.buffer.is_some() {
            return Err(DxfError::invalid("内部错误：尝试多次回退 DXF pair"));
        }
        self.buffer = Some(pair);
        Ok(())
    }
}

fn assign_coord(slot: &mut Option<f64>, raw: &str, context: &str) -> Result<(), DxfError> {
    if slot.is_some() {
        return Err(DxfError::invalid(format!("{context} 出现重复值")));
    }
    *slot = Some(parse_f64(raw, context)?);
    Ok(())
}

fn parse_f64(raw: &str, context: &str) -> Result<f64, DxfError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities_section(body: &str) -> String {
        format!("0\nSECTION\n2\nENTITIES\n{body}0\nENDSEC\n0\nEOF\n")
    }

    #[test]
    fn header_and_tables_are_skipped() {
        let source = format!(
            "0\nSECTION\n2\nHEADER\n9\n$ACADVER\n1\nAC1015\n0\nENDSEC\n\
             0\nSECTION\n2\nTABLES\n0\nTABLE\n2\nLAYER\n0\nENDTAB\n0\nENDSEC\n{}",
            entities_section("0\nLINE\n8\nF.SilkS\n10\n0\n20\n0\n11\n1\n21\n0\n")
        );
        let doc = DxfFacade::new().parse_str(&source).unwrap();
        assert_eq!(doc.entities().count(), 1);
    }

    #[test]
    fn line_without_layer_lands_on_layer_zero() {
        let source = entities_section("0\nLINE\n10\n1.5\n20\n-2\n30\n0\n11\n3\n21\n4\n31\n0\n");
        let doc = DxfFacade::new().parse_str(&source).unwrap();
        match doc.entities().next().map(|(_, e)| e) {
            Some(Entity::Line(line)) => {
                assert_eq!(line.layer, "0");
                assert_eq!(line.start, Point2::new(1.5, -2.0));
                assert_eq!(line.end, Point2::new(3.0, 4.0));
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn arc_angles_stay_in_degrees() {
        let source =
            entities_section("0\nARC\n8\nEdge.Cuts\n10\n1\n20\n2\n40\n3\n50\n270\n51\n90\n");
        let doc = DxfFacade::new().parse_str(&source).unwrap();
        match doc.entities().next().map(|(_, e)| e) {
            Some(Entity::Arc(arc)) => {
                assert_eq!(arc.layer, "Edge.Cuts");
                assert!((arc.radius - 3.0).abs() < 1e-12);
                assert!((arc.start_angle - 270.0).abs() < 1e-12);
                assert!((arc.end_angle - 90.0).abs() < 1e-12);
            }
            other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn other_entities_are_kept_as_unsupported() {
        let source = entities_section(
            "0\nCIRCLE\n8\nF.Cu\n10\n0\n20\n0\n40\n1\n0\nTEXT\n1\nhello\n",
        );
        let doc = DxfFacade::new().parse_str(&source).unwrap();
        let kinds: Vec<_> = doc
            .entities()
            .map(|(_, e)| (e.kind().to_string(), e.layer_name().to_string()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("CIRCLE".to_string(), "F.Cu".to_string()),
                ("TEXT".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn duplicate_and_missing_coordinates_are_rejected() {
        let duplicate = entities_section("0\nLINE\n10\n0\n10\n1\n20\n0\n11\n1\n21\n0\n");
        let missing = entities_section("0\nARC\n10\n0\n20\n0\n50\n0\n51\n90\n");
        for source in [duplicate, missing] {
            assert!(matches!(
                DxfFacade::new().parse_str(&source),
                Err(IoError::InvalidDocument(_))
            ));
        }
    }

    #[test]
    fn malformed_numbers_report_context() {
        let source = entities_section("0\nLINE\n10\nabc\n20\n0\n11\n1\n21\n0\n");
        match DxfFacade::new().parse_str(&source) {
            Err(IoError::InvalidDocument(message)) => assert!(message.contains("LINE 起点 X")),
            other => panic!("expected invalid document, got {other:?}"),
        }
    }

    #[test]
    fn truncated_entities_section_is_an_error() {
        let source = "0\nSECTION\n2\nENTITIES\n0\nLINE\n10\n0\n";
        assert!(DxfFacade::new().parse_str(source).is_err());
    }

    #[test]
    fn comment_pairs_are_ignored() {
        let body = "0\nLINE\n999\nnote\n8\nF.SilkS\n10\n0\n20\n0\n11\n1\n21\n0\n";
        let source = format!("999\ndxfrw 0.6.3\n{}", entities_section(body));
        let doc = DxfFacade::new().parse_str(&source).unwrap();
        match doc.entities().next().map(|(_, e)| e) {
            Some(Entity::Line(line)) => {
                assert_eq!(line.layer, "F.SilkS");
                assert_eq!(line.end, Point2::new(1.0, 0.0));
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let source = entities_section("0\nLINE\n8\nF.SilkS\n10\n0\n20\n0\n11\n1\n21\n0\n")
            .replace('\n', "\r\n");
        let doc = DxfFacade::new().parse_str(&source).unwrap();
        assert_eq!(
            doc.entities().next().map(|(_, e)| e.layer_name()),
            Some("F.SilkS")
        );
    }
}
