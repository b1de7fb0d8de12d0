//! `/proc/[pid]/exe` 生成器 - 可执行文件路径
//!
//! 对应条目以符号链接模式挂载，且仅当进程在登记时有有效可执行文件
//! 才会被创建；没有可执行文件不是错误，只是没有这个条目。

use alloc::vec::Vec;

use vfs::FsError;

use crate::ops::proc_ops;
use crate::provider::ContentGenerator;
use crate::scope::ProcessInspectionScope;

/// 为指定任务生成 `/proc/[pid]/exe` 链接目标的生成器
pub struct ExeGenerator {
    pid: u32,
}

impl ExeGenerator {
    /// 创建生成器（绑定到指定 pid）。
    pub fn new(pid: u32) -> Self {
        ExeGenerator { pid }
    }
}

impl ContentGenerator for ExeGenerator {
    fn generate(&self) -> Result<Vec<u8>, FsError> {
        let _scope = ProcessInspectionScope::new(self.pid);
        let task = proc_ops().get_task(self.pid).ok_or(FsError::NotFound)?;
        let path = task.exe_path().ok_or(FsError::NotFound)?;
        Ok(path.into_bytes())
    }
}
