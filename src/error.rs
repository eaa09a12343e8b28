//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，替代各处分散的
//! `.map_err(|e| e.to_string())`、`format!(...)`、`expect()` 等不一致模式。
//! 演示程序入口统一返回 `Result<(), AppError>`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `SliceError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。

use crate::slicer::SliceError;

/// 应用级统一错误类型
///
/// 演示程序的所有阶段均返回此类型，确保调用方收到一致的错误格式。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 切片渲染流水线错误（配置 / 几何 / 绘制 / 导出）
    #[error("{0}")]
    Slice(#[from] SliceError),

    /// 源图片解码失败
    #[error("图片解码失败: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 输出序列化错误
    #[error("布局清单序列化失败: {0}")]
    Manifest(#[from] serde_json::Error),

    /// 命令行参数错误
    #[error("参数错误: {0}")]
    Usage(String),
}
