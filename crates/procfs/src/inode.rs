//! ProcFS 的 VFS Inode 桥接
//!
//! [`ProcInode`] 是指向合成目录树中某个条目的轻量句柄：一份树引用加一个
//! 稳定索引。句柄可以在条目被摘除后继续存在，此时所有操作返回 NotFound。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use vfs::{DirEntry, FsError, Inode, InodeMetadata, InodeType};

use crate::tree::{EntryIndex, SynthTree};

/// ProcFS 中的 inode 节点
pub struct ProcInode {
    tree: Arc<SynthTree>,
    index: EntryIndex,
}

impl ProcInode {
    pub(crate) fn new(tree: Arc<SynthTree>, index: EntryIndex) -> Arc<Self> {
        Arc::new(ProcInode { tree, index })
    }

    /// 该 inode 在合成目录树中的索引
    pub fn index(&self) -> EntryIndex {
        self.index
    }
}

impl Inode for ProcInode {
    fn metadata(&self) -> Result<InodeMetadata, FsError> {
        let mut meta = self.tree.metadata(self.index)?;
        if meta.inode_type == InodeType::Symlink {
            meta.size = self.tree.readlink_target(self.index)?.len();
        }
        Ok(meta)
    }

    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize, FsError> {
        let data = self.tree.generate(self.index)?;
        if offset >= data.len() {
            return Ok(0);
        }
        let to_read = (data.len() - offset).min(buf.len());
        buf[..to_read].copy_from_slice(&data[offset..offset + to_read]);
        Ok(to_read)
    }

    fn lookup(&self, name: &str) -> Result<Arc<dyn Inode>, FsError> {
        let child = self.tree.lookup_child(self.index, name)?;
        Ok(ProcInode::new(self.tree.clone(), child) as Arc<dyn Inode>)
    }

    fn readdir(&self) -> Result<Vec<DirEntry>, FsError> {
        self.tree.read_dir(self.index)
    }

    fn readlink(&self) -> Result<String, FsError> {
        self.tree.readlink_target(self.index)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
