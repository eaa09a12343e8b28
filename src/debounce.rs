//! # 通用防抖模块
//!
//! ## 设计思路
//!
//! 尾沿防抖：一串密集触发只在安静满一个窗口后执行一次动作，
//! 每次新触发都把窗口重新计时。同一时刻至多一个待命定时器，
//! 动作在后台工作线程上同步执行完毕后才处理后续触发。
//!
//! ## 实现思路
//!
//! - 共享状态只有"截止时刻 + 工作线程是否在跑"，锁粒度极小。
//! - `call` 推进截止时刻；必要时拉起尾沿工作线程。
//! - 工作线程睡到截止时刻后复查：被推迟则继续睡，被取消则退出，
//!   到期则清空截止时刻并执行动作；动作期间新到的触发会让它再睡一轮。
//! - 锁中毒时记录告警并继续使用恢复数据，防抖器不因单次 panic 失效。

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// 距截止时刻还需等待的时长；已到期返回 `None`。
fn remaining_wait(now: Instant, deadline: Instant) -> Option<Duration> {
    if now >= deadline {
        None
    } else {
        Some(deadline - now)
    }
}

#[derive(Debug, Default)]
struct DebounceState {
    deadline: Option<Instant>,
    worker_running: bool,
}

/// 通用尾沿防抖器。
///
/// `call` 触发/重置窗口，`cancel` 丢弃未执行的待命动作。
pub struct Debouncer {
    delay: Duration,
    action: Arc<dyn Fn() + Send + Sync>,
    state: Arc<Mutex<DebounceState>>,
}

impl Debouncer {
    pub fn new(delay: Duration, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            delay,
            action: Arc::new(action),
            state: Arc::new(Mutex::new(DebounceState::default())),
        }
    }

    /// 触发一次：重置防抖窗口，必要时拉起尾沿工作线程。
    pub fn call(&self) {
        let deadline = Instant::now() + self.delay;
        let mut spawn_worker = false;

        {
            let mut state = lock_state(&self.state);
            state.deadline = Some(deadline);
            if !state.worker_running {
                state.worker_running = true;
                spawn_worker = true;
            }
        }

        if spawn_worker {
            self.spawn_tail_worker();
        }
    }

    /// 取消未执行的待命动作；已在执行中的动作不被打断。
    pub fn cancel(&self) {
        let mut state = lock_state(&self.state);
        state.deadline = None;
    }

    /// 是否存在待命（尚未执行）的动作。
    pub fn is_pending(&self) -> bool {
        lock_state(&self.state).deadline.is_some()
    }

    fn spawn_tail_worker(&self) {
        let action = Arc::clone(&self.action);
        let state = Arc::clone(&self.state);

        thread::spawn(move || {
            let mut wait_for = Duration::ZERO;

            loop {
                if !wait_for.is_zero() {
                    thread::sleep(wait_for);
                }

                let fire;
                {
                    let mut guard = lock_state(&state);

                    let deadline = match guard.deadline {
                        Some(deadline) => deadline,
                        None => {
                            guard.worker_running = false;
                            break;
                        }
                    };

                    match remaining_wait(Instant::now(), deadline) {
                        Some(remaining) => {
                            wait_for = remaining;
                            continue;
                        }
                        None => {
                            guard.deadline = None;
                            fire = true;
                        }
                    }
                }

                if fire {
                    action();
                }

                // 动作执行期间可能有新触发到达，回头再看一眼截止时刻
                let mut guard = lock_state(&state);
                match guard.deadline {
                    Some(deadline) => {
                        wait_for = remaining_wait(Instant::now(), deadline)
                            .unwrap_or(Duration::ZERO);
                    }
                    None => {
                        guard.worker_running = false;
                        break;
                    }
                }
            }
        });
    }
}

fn lock_state(state: &Mutex<DebounceState>) -> std::sync::MutexGuard<'_, DebounceState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("防抖状态锁中毒，继续使用恢复数据");
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn remaining_wait_returns_expected_values() {
        let now = Instant::now();
        assert_eq!(
            remaining_wait(now, now + Duration::from_millis(60)),
            Some(Duration::from_millis(60))
        );
        assert_eq!(remaining_wait(now, now), None);
        assert_eq!(remaining_wait(now + Duration::from_millis(10), now), None);
    }

    #[test]
    fn burst_of_calls_fires_action_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let debouncer = Debouncer::new(Duration::from_millis(50), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        for _ in 0..5 {
            debouncer.call();
            thread::sleep(Duration::from_millis(5));
        }

        thread::sleep(Duration::from_millis(120));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn cancel_discards_pending_action() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let debouncer = Debouncer::new(Duration::from_millis(40), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        debouncer.call();
        debouncer.cancel();
        thread::sleep(Duration::from_millis(100));

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn calls_after_fire_rearm_the_window() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let debouncer = Debouncer::new(Duration::from_millis(30), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        debouncer.call();
        thread::sleep(Duration::from_millis(80));
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        debouncer.call();
        thread::sleep(Duration::from_millis(80));
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
