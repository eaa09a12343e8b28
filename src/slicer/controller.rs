//! # 尺寸变化编排模块（状态机）
//!
//! ## 设计思路
//!
//! 状态机固定为 **Idle → PendingRecompute →（防抖窗口到期）→ Recomputing → Idle**。
//! 尺寸变化事件是唯一的异步触发源，密集的事件串被防抖器合并为一次重算；
//! 重算同步跑完才处理后续事件，全程无并发访问工作台。
//!
//! ## 实现思路
//!
//! - 宿主协作者（`GlassSurface` / `ColumnMount`）与渲染器收进 `Arc` 共享内核，
//!   防抖工作线程通过内核执行重算。
//! - 构造期快速失败：源未就绪直接报错，不产出退化瓦片。
//! - 首次布局在构造时立即执行，之后只有防抖到期才重算。
//! - 分带在渲染器构造时就已固定，重算只刷新测量与像素几何。

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::debounce::Debouncer;

use super::handler::GlassSlicer;
use super::source::{ColumnMount, GlassSurface};
use super::{SliceConfig, SliceError};

/// 重算状态机的可观测状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeState {
    /// 空闲，等待尺寸变化事件。
    Idle,
    /// 已有事件到达，防抖定时器待命。
    PendingRecompute,
    /// 防抖窗口到期，完整重算执行中。
    Recomputing,
}

const STATE_IDLE: u8 = 0;
const STATE_PENDING: u8 = 1;
const STATE_RECOMPUTING: u8 = 2;

struct ControllerCore<S, M> {
    slicer: GlassSlicer,
    surface: Mutex<S>,
    mount: Mutex<M>,
    state: AtomicU8,
    passes: AtomicU64,
}

impl<S: GlassSurface, M: ColumnMount> ControllerCore<S, M> {
    /// 一次完整重算：重新测量 → 完整布局 → 按序应用到挂载点。
    fn recompute(&self) -> Result<(), SliceError> {
        self.state.store(STATE_RECOMPUTING, Ordering::SeqCst);

        let result = (|| {
            let surface = lock_or_recover(&self.surface, "图片插槽");
            let measurements = surface.measure();
            let columns = self.slicer.layout_pass(surface.pixels(), &measurements)?;

            let mut mount = lock_or_recover(&self.mount, "列挂载点");
            for column in &columns {
                mount.apply(column);
            }
            Ok(())
        })();

        self.passes.fetch_add(1, Ordering::SeqCst);
        // 重算期间可能有新事件把状态置回 Pending，只在仍是 Recomputing 时归位 Idle
        let _ = self.state.compare_exchange(
            STATE_RECOMPUTING,
            STATE_IDLE,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        result
    }
}

fn lock_or_recover<'a, T>(lock: &'a Mutex<T>, what: &str) -> std::sync::MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("{}锁中毒，继续使用恢复数据", what);
            poisoned.into_inner()
        }
    }
}

/// 碎裂玻璃控制器：一个被标记容器对应一个实例，实例间完全独立。
pub struct GlassController<S, M> {
    core: Arc<ControllerCore<S, M>>,
    debouncer: Debouncer,
}

impl<S, M> GlassController<S, M>
where
    S: GlassSurface + Send + 'static,
    M: ColumnMount + Send + 'static,
{
    /// 创建控制器并立即完成首次布局。
    ///
    /// 前置条件：图片已加载完成。源未就绪或配置非法都会在此处报错，
    /// 不会静默产出退化布局。
    pub fn new(config: SliceConfig, surface: S, mount: M) -> Result<Self, SliceError> {
        let debounce_ms = config.debounce_ms;
        let slicer = GlassSlicer::new(config)?;

        let initial = surface.measure();
        if !initial.is_ready() {
            return Err(SliceError::SourceNotReady(format!(
                "构造期测量存在零值（展示 {}x{}，源 {}x{}）",
                initial.display_width,
                initial.display_height,
                initial.source_width,
                initial.source_height
            )));
        }

        let core = Arc::new(ControllerCore {
            slicer,
            surface: Mutex::new(surface),
            mount: Mutex::new(mount),
            state: AtomicU8::new(STATE_IDLE),
            passes: AtomicU64::new(0),
        });

        core.recompute()?;
        log::info!("🪟 控制器初始化完成，首次布局已应用");

        let worker_core = Arc::clone(&core);
        let debouncer = Debouncer::new(Duration::from_millis(debounce_ms), move || {
            if let Err(err) = worker_core.recompute() {
                log::error!("尺寸变化重算失败：{}", err);
            }
        });

        Ok(Self { core, debouncer })
    }

    /// 从容器的两个具名插槽构造控制器。
    ///
    /// 页面引导扫描出的容器必须同时提供图片插槽与列挂载点，
    /// 缺任何一个都在构造期报 `MissingSlot`，不静默空转。
    pub fn from_slots(
        config: SliceConfig,
        image_slot: Option<S>,
        glass_slot: Option<M>,
    ) -> Result<Self, SliceError> {
        let surface = image_slot
            .ok_or_else(|| SliceError::MissingSlot("image（源图片插槽）".to_string()))?;
        let mount = glass_slot
            .ok_or_else(|| SliceError::MissingSlot("glass（列挂载点）".to_string()))?;
        Self::new(config, surface, mount)
    }

    /// 尺寸变化事件入口：重置防抖窗口，窗口安静满后触发一次完整重算。
    pub fn notify_resize(&self) {
        self.core.state.store(STATE_PENDING, Ordering::SeqCst);
        self.debouncer.call();
        log::trace!("⏱️ 尺寸变化事件已入防抖窗口");
    }

    /// 丢弃待命中的重算（执行中的不受影响）。
    pub fn cancel_pending(&self) {
        self.debouncer.cancel();
        self.core.state.store(STATE_IDLE, Ordering::SeqCst);
    }

    /// 当前状态机状态。
    pub fn state(&self) -> ResizeState {
        match self.core.state.load(Ordering::SeqCst) {
            STATE_PENDING => ResizeState::PendingRecompute,
            STATE_RECOMPUTING => ResizeState::Recomputing,
            _ => ResizeState::Idle,
        }
    }

    /// 已完成的重算轮次（含构造期首次布局）。
    pub fn recompute_passes(&self) -> u64 {
        self.core.passes.load(Ordering::SeqCst)
    }
}
