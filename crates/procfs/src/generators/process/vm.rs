//! `/proc/[pid]/vm` 生成器 - 内存区域与物理页支撑

use alloc::vec::Vec;
use core::fmt::Write;

use vfs::FsError;

use crate::ops::proc_ops;
use crate::provider::{ContentGenerator, OutBuf};
use crate::scope::ProcessInspectionScope;

/// 为指定任务生成 `/proc/[pid]/vm` 内容的生成器
pub struct VmGenerator {
    pid: u32,
}

impl VmGenerator {
    /// 创建生成器（绑定到指定 pid）。
    pub fn new(pid: u32) -> Self {
        VmGenerator { pid }
    }
}

impl ContentGenerator for VmGenerator {
    fn generate(&self) -> Result<Vec<u8>, FsError> {
        let _scope = ProcessInspectionScope::new(self.pid);
        let task = proc_ops().get_task(self.pid).ok_or(FsError::NotFound)?;
        let regions = task.memory_regions();

        let estimate: usize = 80
            + regions
                .iter()
                .map(|region| 80 + region.pages.len() * 24)
                .sum::<usize>();
        let Some(mut out) = OutBuf::with_estimate(estimate) else {
            return Ok(Vec::new());
        };

        let _ = writeln!(out, "BEGIN       END         SIZE        NAME");
        for region in &regions {
            let end = region.start + region.size.saturating_sub(1);
            let _ = writeln!(
                out,
                "{:x} -- {:x}    {:x}    {}",
                region.start, end, region.size, region.name
            );
            for page in &region.pages {
                let _ = write!(
                    out,
                    "P{:x}{}({}) ",
                    page.paddr,
                    if page.cow { "!" } else { "" },
                    page.ref_count
                );
            }
            let _ = out.write_char('\n');
        }
        Ok(out.into_bytes())
    }
}
