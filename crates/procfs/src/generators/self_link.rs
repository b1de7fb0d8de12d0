//! `/proc/self` 生成器 - 指向当前进程目录的动态符号链接

use alloc::format;
use alloc::vec::Vec;

use vfs::FsError;

use crate::ops::proc_ops;
use crate::provider::ContentGenerator;

/// `/proc/self` 链接目标生成器。
///
/// 目标是读取发起方自己的十进制 pid，每次读取时重新解析。
pub struct SelfLinkGenerator;

impl ContentGenerator for SelfLinkGenerator {
    fn generate(&self) -> Result<Vec<u8>, FsError> {
        let pid = proc_ops().current_task_pid();
        Ok(format!("{pid}").into_bytes())
    }
}
