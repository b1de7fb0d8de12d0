//! 架构相关操作的 Mock 实现

use core::sync::atomic::{AtomicBool, Ordering};

/// Mock 架构操作
///
/// 用一个原子布尔值模拟本地 CPU 的中断使能状态。
pub struct MockArchOps {
    /// 模拟的中断使能状态
    pub interrupt_state: AtomicBool,
}

impl MockArchOps {
    /// 创建 Mock 实例（中断初始为启用）
    pub const fn new() -> Self {
        Self {
            interrupt_state: AtomicBool::new(true),
        }
    }

    /// 读取并"禁用"模拟中断，返回之前的状态字
    ///
    /// # Safety
    /// 仅操作自身的原子状态，无真实副作用。
    pub unsafe fn read_and_disable_interrupts(&self) -> usize {
        if self.interrupt_state.swap(false, Ordering::SeqCst) {
            self.intr_enable_bit()
        } else {
            0
        }
    }

    /// 恢复模拟中断状态
    ///
    /// # Safety
    /// flags 应为之前 read_and_disable_interrupts 的返回值。
    pub unsafe fn restore_interrupts(&self, flags: usize) {
        self.interrupt_state.store(flags != 0, Ordering::SeqCst);
    }

    /// 中断使能位掩码
    pub fn intr_enable_bit(&self) -> usize {
        0x2
    }
}

impl Default for MockArchOps {
    fn default() -> Self {
        Self::new()
    }
}

/// 全局 Mock 实例
pub static MOCK_ARCH_OPS: MockArchOps = MockArchOps::new();
