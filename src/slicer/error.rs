//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载切片渲染链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。

/// 切片渲染统一错误类型。
///
/// 该类型会在演示程序入口被上转为 `AppError`，最终透传给调用方。
#[derive(Debug, thiserror::Error)]
pub enum SliceError {
    #[error("配置错误：{0}")]
    InvalidConfig(String),

    #[error("容器缺少必需插槽：{0}")]
    MissingSlot(String),

    #[error("源图片未就绪：{0}")]
    SourceNotReady(String),

    #[error("几何计算异常：{0}")]
    Geometry(String),

    #[error("瓦片导出失败：{0}")]
    Encode(String),
}

impl From<SliceError> for String {
    /// 兼容部分仍使用字符串错误的调用点。
    fn from(error: SliceError) -> Self {
        error.to_string()
    }
}
