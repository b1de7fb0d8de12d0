//! `/proc/[pid]/fds` 生成器 - 打开的文件描述符表

use alloc::vec::Vec;
use core::fmt::Write;

use vfs::FsError;

use crate::ops::proc_ops;
use crate::provider::{ContentGenerator, OutBuf};
use crate::scope::ProcessInspectionScope;

/// 为指定任务生成 `/proc/[pid]/fds` 内容的生成器
pub struct FdsGenerator {
    pid: u32,
}

impl FdsGenerator {
    /// 创建生成器（绑定到指定 pid）。
    pub fn new(pid: u32) -> Self {
        FdsGenerator { pid }
    }
}

impl ContentGenerator for FdsGenerator {
    fn generate(&self) -> Result<Vec<u8>, FsError> {
        let _scope = ProcessInspectionScope::new(self.pid);
        let task = proc_ops().get_task(self.pid).ok_or(FsError::NotFound)?;
        let slots = task.descriptor_slots();

        let Some(mut out) = OutBuf::with_estimate(slots.len() * 80) else {
            return Ok(Vec::new());
        };
        for (fd, slot) in slots.iter().enumerate() {
            // 空槽跳过
            let Some(path) = slot else {
                continue;
            };
            let _ = writeln!(out, "{fd:>3} {path}");
        }
        Ok(out.into_bytes())
    }
}
