use std::io::Write;
use std::path::Path;

use dxf2mod_config::{AppConfig, OutputConfig};
use dxf2mod_core::document::{Document, Footprint};
use dxf2mod_engine::{StitchOptions, trace_outlines};
use dxf2mod_io::{DocumentLoader, DxfFacade, FootprintSaver, KicadModFacade};
use tracing::info;

use crate::errors::AppError;

/// 一次转换所需的全部参数，由配置文件与命令行覆盖项合并而来。
#[derive(Debug, Clone)]
pub struct ConvertSettings {
    pub stitch: StitchOptions,
    pub output: OutputConfig,
}

impl ConvertSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            stitch: StitchOptions {
                tolerance: config.stitch.tolerance,
                reject_ambiguous_junctions: config.stitch.reject_ambiguous_junctions,
            },
            output: config.output.clone(),
        }
    }
}

/// 读取 DXF、拼接轮廓并写出 `.kicad_mod`；未指定输出文件时写到标准输出。
pub fn run(
    input: &Path,
    output: Option<&Path>,
    settings: &ConvertSettings,
) -> Result<(), AppError> {
    let document = DxfFacade::new().load(input)?;
    info!(
        path = %input.display(),
        layer_count = document.layers().count(),
        entity_count = document.entities().count(),
        "从 DXF 加载文档成功"
    );

    let footprint = build_footprint(&document, settings)?;
    let saver = KicadModFacade::new();
    match output {
        Some(path) => {
            saver.save(&footprint, path)?;
            info!(path = %path.display(), polygons = footprint.polygons.len(), "封装已写出");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(saver.render(&footprint).as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(AppError::Stdout)?;
        }
    }
    Ok(())
}

/// 把文档中所有图层的轮廓整理为封装。
pub fn build_footprint(
    document: &Document,
    settings: &ConvertSettings,
) -> Result<Footprint, AppError> {
    let outlines = trace_outlines(
        document.entities().map(|(_, entity)| entity),
        &settings.stitch,
    )?;

    let mut footprint = Footprint::new(settings.output.module_name.clone());
    for outline in outlines {
        let layer = settings.output.kicad_layer(&outline.layer).to_string();
        for polygon in outline.polygons {
            footprint.push_polygon(layer.clone(), polygon, settings.output.stroke_width);
        }
    }
    Ok(footprint)
}
