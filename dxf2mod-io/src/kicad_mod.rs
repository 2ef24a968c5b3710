//! KiCad 旧版封装格式（`.kicad_mod` s-expression）写出。

use std::fmt::Write as _;

use dxf2mod_core::document::{Footprint, FootprintPolygon};

use crate::FootprintSaver;

/// 把 [`Footprint`] 写成 `(module …)` 文本，每个多边形一条 `fp_poly`。
#[derive(Debug, Default, Clone, Copy)]
pub struct KicadModFacade;

impl KicadModFacade {
    pub fn new() -> Self {
        Self
    }
}

impl FootprintSaver for KicadModFacade {
    fn render(&self, footprint: &Footprint) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "(module {}", atom(&footprint.name));
        for polygon in &footprint.polygons {
            out.push_str("  ");
            write_poly(&mut out, polygon);
            out.push('\n');
        }
        out.push_str(")\n");
        out
    }
}

fn write_poly(out: &mut String, polygon: &FootprintPolygon) {
    out.push_str("(fp_poly (pts");
    for point in &polygon.points {
        let _ = write!(
            out,
            " (xy {} {})",
            format_number(point.x()),
            format_number(point.y())
        );
    }
    let _ = write!(
        out,
        ") (layer {}) (width {}))",
        atom(&polygon.layer),
        format_number(polygon.width)
    );
}

/// 最多保留 6 位小数并去掉多余的 0。
fn format_number(value: f64) -> String {
    let mut text = format!("{value:.6}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

/// 需要时为 s-expression 原子加引号。
fn atom(raw: &str) -> String {
    let needs_quotes = raw.is_empty()
        || raw
            .chars()
            .any(|ch| ch.is_whitespace() || matches!(ch, '(' | ')' | '"' | '\\'));
    if !needs_quotes {
        return raw.to_string();
    }
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for ch in raw.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
