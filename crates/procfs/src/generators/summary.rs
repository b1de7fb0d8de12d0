//! `/proc/summary` 生成器 - 进程表概览

use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt::Write;

use sync::IntrGuard;
use vfs::FsError;

use crate::ops::proc_ops;
use crate::provider::{ContentGenerator, OutBuf};

/// `/proc/summary` 内容生成器。
///
/// 每个存活进程一行，行序即临界区内观察到的进程表遍历顺序。
pub struct SummaryGenerator;

impl ContentGenerator for SummaryGenerator {
    fn generate(&self) -> Result<Vec<u8>, FsError> {
        // 整个遍历在全局临界区内进行，保证看到的是同一份进程表快照
        let _guard = IntrGuard::new();
        let ops = proc_ops();
        let pids = ops.list_process_pids();

        let Some(mut out) = OutBuf::with_estimate(80 + pids.len() * 256) else {
            return Ok(Vec::new());
        };
        let _ = writeln!(
            out,
            "PID TPG PGP SID  OWNER  STATE      PPID NSCHED     FDS  TTY  NAME"
        );
        for pid in pids {
            let Some(task) = ops.get_task(pid) else {
                continue;
            };
            let _ = writeln!(
                out,
                "{:>3} {:>3} {:>3} {:>3}  {:>4}   {:>8}   {:>3}  {:>9}  {:>3}  {:>4}  {}",
                task.pid(),
                task.tty_pgid().unwrap_or(0),
                task.pgid(),
                task.sid(),
                task.uid(),
                task.state().name(),
                task.ppid(),
                task.times_scheduled(),
                task.open_descriptor_count(),
                task.tty_name().unwrap_or_else(|| "n/a".to_string()),
                task.name(),
            );
        }
        Ok(out.into_bytes())
    }
}
