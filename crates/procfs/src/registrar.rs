//! 进程登记器
//!
//! 与进程生命周期同步地维护 per-PID 子树：进程创建时登记，销毁时注销。
//! 两个操作都在全局临界区内一步完成，文件系统视角下不存在半构造的子树。
//!
//! 子树内的生成器只捕获进程号这一非拥有句柄，生成时再经进程表解析；
//! 因此游离在外的诊断 inode 句柄不会延长进程的生命周期。

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::sync::Arc;
use sync::{IntrGuard, SpinLock};
use vfs::FileMode;

use crate::generators::{ExeGenerator, FdsGenerator, StackGenerator, VmGenerator};
use crate::ops::TaskInfo;
use crate::tree::{EntryIndex, SynthTree};

/// 进程登记器
///
/// 持有 pid 到进程目录索引的映射。映射是"存活且已登记的进程"集合上的
/// 双射：重复登记与注销未登记的 pid 都是致命的契约违反。
pub struct ProcessRegistrar {
    tree: Arc<SynthTree>,
    bindings: SpinLock<BTreeMap<u32, EntryIndex>>,
}

impl ProcessRegistrar {
    /// 创建绑定到指定目录树的登记器
    pub fn new(tree: Arc<SynthTree>) -> Self {
        ProcessRegistrar {
            tree,
            bindings: SpinLock::new(BTreeMap::new()),
        }
    }

    /// 为进程创建并挂载其诊断子树
    ///
    /// 子树以十进制 pid 命名，内含 `vm`、`stack`、`fds`，以及——仅当
    /// 进程有有效可执行文件时——符号链接模式的 `exe`。
    ///
    /// # Panics
    /// 同一 pid 重复登记时 panic。
    pub fn register(&self, task: &dyn TaskInfo) {
        let _guard = IntrGuard::new();
        let pid = task.pid();
        assert!(
            !self.bindings.lock().contains_key(&pid),
            "procfs: pid {pid} registered twice"
        );

        let dir = self.tree.create_directory(&format!("{pid}"));
        self.tree.attach(dir, None);
        self.bindings.lock().insert(pid, dir);

        let vm = self
            .tree
            .create_generated_file("vm", Arc::new(VmGenerator::new(pid)));
        self.tree.attach(vm, Some(dir));

        let stack = self
            .tree
            .create_generated_file("stack", Arc::new(StackGenerator::new(pid)));
        self.tree.attach(stack, Some(dir));

        let fds = self
            .tree
            .create_generated_file("fds", Arc::new(FdsGenerator::new(pid)));
        self.tree.attach(fds, Some(dir));

        if task.exe_path().is_some() {
            let exe = self.tree.create_generated_file_with_mode(
                "exe",
                Arc::new(ExeGenerator::new(pid)),
                FileMode::from_bits_truncate(0o777) | FileMode::S_IFLNK,
            );
            self.tree.attach(exe, Some(dir));
        }

        log::debug!("procfs: registered pid {} at inode {}", pid, dir);
    }

    /// 摘除并释放进程的诊断子树
    ///
    /// # Panics
    /// pid 没有对应的登记时 panic：这说明生命周期协作方的契约被打破
    /// （重复注销，或注销了从未登记的进程），继续运行是不安全的。
    pub fn deregister(&self, pid: u32) {
        let _guard = IntrGuard::new();
        let dir = self
            .bindings
            .lock()
            .remove(&pid)
            .unwrap_or_else(|| panic!("procfs: deregister of unknown pid {pid}"));
        let removed = self.tree.detach(dir);
        assert!(removed, "procfs: failed to detach subtree of pid {pid}");
        log::debug!("procfs: deregistered pid {}", pid);
    }

    /// 查询 pid 对应的进程目录索引
    pub fn dir_index(&self, pid: u32) -> Option<EntryIndex> {
        self.bindings.lock().get(&pid).copied()
    }
}
