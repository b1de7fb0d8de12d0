//! `/proc/mounts` 生成器

use alloc::vec::Vec;
use core::fmt::Write;

use sync::IntrGuard;
use vfs::FsError;

use crate::ops::proc_ops;
use crate::provider::{ContentGenerator, OutBuf};

/// `/proc/mounts` 内容生成器。
///
/// 每个挂载点一行：根挂载点为 `<类型名> @ /`，
/// 其余为 `<类型名> @ <宿主文件系统 ID>:<宿主 inode 号>`。
pub struct MountsGenerator;

impl ContentGenerator for MountsGenerator {
    fn generate(&self) -> Result<Vec<u8>, FsError> {
        let _guard = IntrGuard::new();
        let mounts = proc_ops().list_mounts();

        let Some(mut out) = OutBuf::with_estimate(mounts.len() * 80) else {
            return Ok(Vec::new());
        };
        for mount in mounts {
            match mount.host {
                None => {
                    let _ = writeln!(out, "{} @ /", mount.fs_name);
                }
                Some(host) => {
                    let _ = writeln!(out, "{} @ {}:{}", mount.fs_name, host.fsid, host.inode);
                }
            }
        }
        Ok(out.into_bytes())
    }
}
