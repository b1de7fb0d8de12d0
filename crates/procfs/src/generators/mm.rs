//! `/proc/mm` 生成器 - 物理内存概览

use alloc::vec::Vec;
use core::fmt::Write;

use sync::IntrGuard;
use vfs::FsError;

use crate::ops::proc_ops;
use crate::provider::{ContentGenerator, OutBuf};

/// `/proc/mm` 内容生成器。
pub struct MmGenerator;

impl ContentGenerator for MmGenerator {
    fn generate(&self) -> Result<Vec<u8>, FsError> {
        let _guard = IntrGuard::new();
        let ops = proc_ops();
        let total = ops.total_frames();
        let free = ops.free_frames();

        let Some(mut out) = OutBuf::with_estimate(80) else {
            return Ok(Vec::new());
        };
        let _ = writeln!(out, "Total physical pages: {total}");
        let _ = writeln!(out, "Free physical pages:  {free}");
        Ok(out.into_bytes())
    }
}
