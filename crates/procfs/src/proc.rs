//! ProcFS 文件系统对象
//!
//! 以显式 `Arc` 句柄的形式存在：挂载注册和进程生命周期协作方各自持有
//! 一份句柄，不提供全局单例访问器。全局诊断文件在构造时创建一次，
//! 与文件系统同寿命。

use alloc::sync::Arc;
use sync::IntrGuard;
use vfs::{FileMode, FileSystem, FsError, Inode, StatFs};

use crate::generators::{
    CpuinfoGenerator, KmallocGenerator, MmGenerator, MountsGenerator, SelfLinkGenerator,
    SummaryGenerator,
};
use crate::inode::ProcInode;
use crate::ops::TaskInfo;
use crate::registrar::ProcessRegistrar;
use crate::tree::{EntryIndex, SynthTree, ROOT_INDEX};

/// ProcFS 文件系统对象（提供 `/proc` 目录树）。
pub struct ProcFS {
    tree: Arc<SynthTree>,
    registrar: ProcessRegistrar,
}

impl ProcFS {
    /// 创建新的 ProcFS 实例并铺设全局诊断文件
    pub fn new() -> Arc<Self> {
        let tree = Arc::new(SynthTree::new());
        let fs = Arc::new(ProcFS {
            tree: tree.clone(),
            registrar: ProcessRegistrar::new(tree),
        });
        fs.init_tree();
        fs
    }

    /// 初始化 proc 文件系统树结构
    fn init_tree(&self) {
        let _guard = IntrGuard::new();
        let tree = &self.tree;

        let mm = tree.create_generated_file("mm", Arc::new(MmGenerator));
        tree.attach(mm, None);

        let mounts = tree.create_generated_file("mounts", Arc::new(MountsGenerator));
        tree.attach(mounts, None);

        let kmalloc = tree.create_generated_file("kmalloc", Arc::new(KmallocGenerator));
        tree.attach(kmalloc, None);

        let summary = tree.create_generated_file("summary", Arc::new(SummaryGenerator));
        tree.attach(summary, None);

        let cpuinfo = tree.create_generated_file("cpuinfo", Arc::new(CpuinfoGenerator));
        tree.attach(cpuinfo, None);

        // /proc/self - 动态符号链接，指向当前进程的目录
        let self_link = tree.create_generated_file_with_mode(
            "self",
            Arc::new(SelfLinkGenerator),
            FileMode::from_bits_truncate(0o777) | FileMode::S_IFLNK,
        );
        tree.attach(self_link, None);
    }

    /// 进程创建时由生命周期协作方调用，挂载其诊断子树
    pub fn register_task(&self, task: &dyn TaskInfo) {
        self.registrar.register(task);
    }

    /// 进程销毁时由生命周期协作方调用，摘除其诊断子树
    ///
    /// # Panics
    /// pid 未登记时 panic（契约违反，见 [`ProcessRegistrar::deregister`]）。
    pub fn deregister_task(&self, pid: u32) {
        self.registrar.deregister(pid);
    }

    /// 查询 pid 对应的进程目录索引
    pub fn process_dir_index(&self, pid: u32) -> Option<EntryIndex> {
        self.registrar.dir_index(pid)
    }
}

impl FileSystem for ProcFS {
    fn fs_type(&self) -> &'static str {
        "procfs"
    }

    fn root_inode(&self) -> Arc<dyn Inode> {
        ProcInode::new(self.tree.clone(), ROOT_INDEX) as Arc<dyn Inode>
    }

    fn sync(&self) -> Result<(), FsError> {
        Ok(())
    }

    fn statfs(&self) -> Result<StatFs, FsError> {
        Ok(StatFs {
            block_size: 4096,
            total_blocks: 0,
            free_blocks: 0,
            available_blocks: 0,
            total_inodes: self.tree.live_entries(),
            free_inodes: 0,
            fsid: 0,
            max_filename_len: 255,
        })
    }
}
