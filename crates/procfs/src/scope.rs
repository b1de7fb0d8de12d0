//! 跨进程检查的快照保护作用域
//!
//! 与 [`sync::IntrGuard`]（全局临界区）配合使用的两级 RAII 作用域。
//! 任何退出路径（正常、提前返回、出错）都会成对释放。

use crate::ops::proc_ops;

/// 进程检查作用域
///
/// 构造时钉住被检查的进程，使其在为某个诊断文件生成内容期间不会被
/// 销毁或释放资源；析构时解除钉住。
pub struct ProcessInspectionScope {
    pid: u32,
}

impl ProcessInspectionScope {
    /// 钉住指定进程并进入检查作用域
    pub fn new(pid: u32) -> Self {
        proc_ops().pin_task(pid);
        ProcessInspectionScope { pid }
    }
}

impl Drop for ProcessInspectionScope {
    fn drop(&mut self) {
        proc_ops().unpin_task(self.pid);
    }
}

/// 进程分页作用域
///
/// 构造时激活被检查进程的地址翻译上下文，使该进程保存的执行现场中的
/// 原始地址（帧指针、指令指针）可以被正确解引用；析构时恢复调用者
/// 原先的上下文。仅调用栈生成器需要此作用域。
pub struct ProcessPagingScope {
    token: usize,
}

impl ProcessPagingScope {
    /// 切入指定进程的地址空间
    pub fn new(pid: u32) -> Self {
        let token = proc_ops().enter_address_space(pid);
        ProcessPagingScope { token }
    }
}

impl Drop for ProcessPagingScope {
    fn drop(&mut self) {
        proc_ops().leave_address_space(self.token);
    }
}
