use dxf2mod_engine::EngineError;
use dxf2mod_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("写入标准输出失败: {0}")]
    Stdout(#[source] std::io::Error),
}
