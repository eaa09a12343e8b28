//! # 切片与镜像渲染模块（slicer）
//!
//! ## 设计思路
//!
//! 该模块把"测量读取 → 分带 → 双空间几何 → 镜像瓦片 → 列落位 → 防抖重算"
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `config`：列数、畸变系数、滤镜与防抖窗口（构造期校验）
//! - `source`：数据模型与宿主协作者 trait（图片插槽 / 列挂载点）
//! - `geometry`：分带与双空间几何，全部纯函数
//! - `tile`：工作台绘制、水平镜像、data URI 导出
//! - `placement`：列宽、列高、横向偏移
//! - `handler`：单次布局的全流程编排与缓存
//! - `controller`：防抖重算状态机
//! - `error`：统一错误模型
//!
//! ## 实现思路
//!
//! 对外仅暴露必要类型，内部细节保持 `mod` 私有。
//! 几何与落位不依赖光栅和宿主环境，可在无图片的情况下独立测试。
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! 宿主 notify_resize()
//!    ↓
//! controller.rs（防抖状态机：Idle → Pending → Recomputing）
//!    ↓
//! handler.rs（单次布局编排 + 阶段耗时日志 + 幂等缓存）
//!    ├─ geometry.rs（分带 + 双空间像素区间 + 右缘夹取）
//!    ├─ tile.rs（工作台 + 左半幅缩放 + 镜像 + PNG/base64 导出）
//!    └─ placement.rs（列宽 = 绘制宽 / 畸变，偏移 = 列宽 × 序号）
//!    ↓
//! ColumnMount::apply（宿主应用背景图与布局几何）
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod handler;
pub mod placement;
pub mod source;
pub mod tile;

pub use config::{RenderQuality, SliceConfig};
pub use controller::{GlassController, ResizeState};
pub use error::SliceError;
pub use handler::GlassSlicer;
pub use source::{
    Band, ColumnMount, ColumnPlacement, ColumnRender, ColumnTile, GlassSurface,
    SourceMeasurements, TileGeometry,
};
