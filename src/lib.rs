//! # 碎裂玻璃效果渲染器 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 宿主环境（页面 / 演示程序）                     │
//! │                                                              │
//! │   GlassSurface（测量 + 源像素）      ColumnMount（列挂载点）     │
//! │        ↕                                  ↕                  │
//! └────────┼──────────────────────────────────┼──────────────────┘
//!          ↕ trait 边界（Result<T, SliceError>）
//! ┌────────┼──────────────────────────────────┼──────────────────┐
//! │        ↕              核心（Rust）         ↕                  │
//! │                                                              │
//! │  ┌─ error ────── AppError（统一错误类型）                      │
//! │  │                                                           │
//! │  ├─ debounce ─── 通用尾沿防抖（重置 / 取消）                    │
//! │  │                                                           │
//! │  └─ slicer ───── 切片与镜像渲染                                │
//! │      ├─ config      列数·畸变·滤镜·防抖窗口                    │
//! │      ├─ geometry    分带 + 双空间几何（纯函数）                 │
//! │      ├─ tile        工作台绘制 + 镜像 + data URI 导出          │
//! │      ├─ placement   列宽·列高·横向偏移                         │
//! │      ├─ handler     单次布局全流程编排 + 瓦片缓存               │
//! │      └─ controller  防抖重算状态机（Idle → Pending → Recompute）│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，演示程序的返回类型 |
//! | [`debounce`] | 通用防抖器：尾沿触发、重复调用重置窗口、可取消 |
//! | [`slicer`] | 分带、镜像瓦片生成、列布局、尺寸变化重算编排 |

pub mod debounce;
pub mod error;
pub mod slicer;
