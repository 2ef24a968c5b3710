use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV_VAR: &str = "DXF2MOD_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub stitch: StitchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `DXF2MOD_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 轮廓拼接参数。容差取决于图纸单位，毫米图纸用默认值即可。
#[derive(Debug, Clone, Deserialize)]
pub struct StitchConfig {
    #[serde(default = "StitchConfig::default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "StitchConfig::default_reject_ambiguous")]
    pub reject_ambiguous_junctions: bool,
}

impl StitchConfig {
    fn default_tolerance() -> f64 {
        1e-2
    }

    fn default_reject_ambiguous() -> bool {
        true
    }
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            tolerance: Self::default_tolerance(),
            reject_ambiguous_junctions: Self::default_reject_ambiguous(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_module_name")]
    pub module_name: String,
    #[serde(default = "OutputConfig::default_stroke_width")]
    pub stroke_width: f64,
    /// DXF 图层名到 KiCad 图层名的映射。
    #[serde(default)]
    pub layer_map: HashMap<String, String>,
}

impl OutputConfig {
    fn default_module_name() -> String {
        "autogenerated".to_string()
    }

    fn default_stroke_width() -> f64 {
        0.001
    }

    /// 查找映射后的 KiCad 图层，未配置的图层原样返回。
    pub fn kicad_layer<'a>(&'a self, dxf_layer: &'a str) -> &'a str {
        self.layer_map
            .get(dxf_layer)
            .map(String::as_str)
            .unwrap_or(dxf_layer)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            module_name: Self::default_module_name(),
            stroke_width: Self::default_stroke_width(),
            layer_map: HashMap::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
