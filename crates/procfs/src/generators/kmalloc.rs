//! `/proc/kmalloc` 生成器 - 内核堆分配器计数

use alloc::vec::Vec;
use core::fmt::Write;

use sync::IntrGuard;
use vfs::FsError;

use crate::ops::proc_ops;
use crate::provider::{ContentGenerator, OutBuf};

/// `/proc/kmalloc` 内容生成器。
///
/// 计数取自存活的分配器，两次读取之间允许观察到不同的值。
pub struct KmallocGenerator;

impl ContentGenerator for KmallocGenerator {
    fn generate(&self) -> Result<Vec<u8>, FsError> {
        let _guard = IntrGuard::new();
        let stats = proc_ops().kmalloc_stats();

        let Some(mut out) = OutBuf::with_estimate(128) else {
            return Ok(Vec::new());
        };
        let _ = writeln!(out, "eternal:      {}", stats.eternal);
        let _ = writeln!(out, "page-aligned: {}", stats.page_aligned);
        let _ = writeln!(out, "allocated:    {}", stats.allocated);
        let _ = writeln!(out, "free:         {}", stats.free);
        Ok(out.into_bytes())
    }
}
