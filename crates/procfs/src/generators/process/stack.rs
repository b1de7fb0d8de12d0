//! `/proc/[pid]/stack` 生成器 - 内核调用栈回溯
//!
//! 从任务保存的执行现场出发回溯帧指针链。每次解引用之前都先用内核
//! 地址范围谓词校验指针，且总帧数有上限：即使链表被破坏成环，回溯
//! 也能有界终止。栈内容只有在其属主地址空间下才有意义，因此整个
//! 回溯在进程分页作用域内进行。

use alloc::vec::Vec;
use core::fmt::Write;

use vfs::FsError;

use crate::ops::{proc_ops, SymbolInfo};
use crate::provider::{ContentGenerator, OutBuf};
use crate::scope::{ProcessInspectionScope, ProcessPagingScope};

/// 回溯的最大帧数上限
const MAX_STACK_FRAMES: usize = 64;

/// 为指定任务生成 `/proc/[pid]/stack` 内容的生成器
pub struct StackGenerator {
    pid: u32,
}

impl StackGenerator {
    /// 创建生成器（绑定到指定 pid）。
    pub fn new(pid: u32) -> Self {
        StackGenerator { pid }
    }
}

struct RecognizedFrame {
    address: usize,
    symbol: SymbolInfo,
}

impl ContentGenerator for StackGenerator {
    fn generate(&self) -> Result<Vec<u8>, FsError> {
        let ops = proc_ops();
        let _scope = ProcessInspectionScope::new(self.pid);
        let task = ops.get_task(self.pid).ok_or(FsError::NotFound)?;
        let _paging = ProcessPagingScope::new(self.pid);

        let mut frames: Vec<RecognizedFrame> = Vec::new();
        let ip = task.saved_instruction_pointer();
        if let Some(symbol) = ops.symbolicate(ip) {
            frames.push(RecognizedFrame {
                address: ip,
                symbol,
            });
        }

        let word = core::mem::size_of::<usize>();
        let mut fp = task.saved_frame_pointer();
        for _ in 0..MAX_STACK_FRAMES {
            if !ops.is_kernel_addr(fp) {
                break;
            }
            // SAFETY: fp 已通过内核地址范围校验，且当前处于目标进程的分页作用域
            let retaddr = unsafe { ops.read_kernel_word(fp + word) };
            if let Some(symbol) = ops.symbolicate(retaddr) {
                frames.push(RecognizedFrame {
                    address: retaddr,
                    symbol,
                });
            }
            // SAFETY: 同上
            fp = unsafe { ops.read_kernel_word(fp) };
        }

        let estimate: usize = frames
            .iter()
            .map(|frame| frame.symbol.name.len() + 8 + 16)
            .sum();
        let Some(mut out) = OutBuf::with_estimate(estimate) else {
            return Ok(Vec::new());
        };
        for frame in &frames {
            let offset = frame.address - frame.symbol.address;
            let _ = writeln!(out, "{:#x}  {} +{}", frame.address, frame.symbol.name, offset);
        }
        Ok(out.into_bytes())
    }
}
