//! 索引寻址的合成目录树
//!
//! 所有条目保存在一个 slab 式 arena 中，以稳定的整数索引（即对外暴露的
//! inode 号）寻址，不构成指针图。索引在条目存活期间保持不变，条目释放
//! 后其索引回到空闲表等待复用。槽位 0 保留不用，根目录固定在索引 1，
//! 使得存活索引与 inode 号一一对应。
//!
//! 树结构只会被进程登记器在全局临界区内修改；读取方向的访问全部经过
//! 内部自旋锁，生成器调用则在锁外进行。

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use sync::SpinLock;
use uapi::time::TimeSpec;
use vfs::{DirEntry, FileMode, FsError, InodeMetadata, InodeType};

use crate::ops::proc_ops;
use crate::provider::ContentGenerator;

/// 合成目录树中条目的稳定索引（inode 号）
pub type EntryIndex = usize;

/// 根目录的固定索引
pub const ROOT_INDEX: EntryIndex = 1;

enum EntryKind {
    /// 目录：子条目索引按创建顺序排列
    Directory { children: Vec<EntryIndex> },
    /// 生成文件：内容在读取时由生成器计算
    Generated { producer: Arc<dyn ContentGenerator> },
}

struct Entry {
    name: String,
    parent: Option<EntryIndex>,
    mode: FileMode,
    ctime: TimeSpec,
    kind: EntryKind,
}

impl Entry {
    fn inode_type(&self) -> InodeType {
        self.mode.inode_type().unwrap_or(InodeType::File)
    }

    fn children(&self) -> Option<&Vec<EntryIndex>> {
        match &self.kind {
            EntryKind::Directory { children } => Some(children),
            EntryKind::Generated { .. } => None,
        }
    }
}

struct TreeInner {
    /// 槽位 0 保留；其余槽位为 Some(存活条目) 或 None(已释放)
    slots: Vec<Option<Entry>>,
    /// 已释放、可复用的索引
    free: Vec<EntryIndex>,
}

impl TreeInner {
    fn entry(&self, index: EntryIndex) -> Option<&Entry> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    fn entry_mut(&mut self, index: EntryIndex) -> Option<&mut Entry> {
        self.slots.get_mut(index).and_then(|slot| slot.as_mut())
    }

    fn alloc(&mut self, entry: Entry) -> EntryIndex {
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(entry);
            index
        } else {
            self.slots.push(Some(entry));
            self.slots.len() - 1
        }
    }
}

/// 合成目录树
///
/// 持有全部条目的 arena 以及根目录。生成文件的读取见
/// [`SynthTree::generate`]；结构修改仅应来自进程登记器和文件系统初始化。
pub struct SynthTree {
    inner: SpinLock<TreeInner>,
}

impl SynthTree {
    /// 创建只含根目录的树
    pub fn new() -> Self {
        let root = Entry {
            name: String::new(),
            parent: None,
            mode: FileMode::from_bits_truncate(0o555) | FileMode::S_IFDIR,
            ctime: proc_ops().timespec_now(),
            kind: EntryKind::Directory {
                children: Vec::new(),
            },
        };
        let mut slots = Vec::with_capacity(8);
        slots.push(None); // 槽位 0 保留
        slots.push(Some(root));
        SynthTree {
            inner: SpinLock::new(TreeInner {
                slots,
                free: Vec::new(),
            }),
        }
    }

    /// 创建一个游离的目录条目，返回其索引
    pub fn create_directory(&self, name: &str) -> EntryIndex {
        self.alloc_entry(
            name,
            FileMode::from_bits_truncate(0o555) | FileMode::S_IFDIR,
            EntryKind::Directory {
                children: Vec::new(),
            },
        )
    }

    /// 创建一个游离的生成文件条目（默认只读普通文件），返回其索引
    pub fn create_generated_file(
        &self,
        name: &str,
        producer: Arc<dyn ContentGenerator>,
    ) -> EntryIndex {
        self.create_generated_file_with_mode(
            name,
            producer,
            FileMode::from_bits_truncate(0o444) | FileMode::S_IFREG,
        )
    }

    /// 创建一个指定 mode 的游离生成文件条目，返回其索引
    ///
    /// mode 含 `S_IFLNK` 类型位时，该条目表现为符号链接：生成器的输出
    /// 被当作链接目标路径。
    pub fn create_generated_file_with_mode(
        &self,
        name: &str,
        producer: Arc<dyn ContentGenerator>,
        mode: FileMode,
    ) -> EntryIndex {
        self.alloc_entry(name, mode, EntryKind::Generated { producer })
    }

    fn alloc_entry(&self, name: &str, mode: FileMode, kind: EntryKind) -> EntryIndex {
        let ctime = proc_ops().timespec_now();
        let entry = Entry {
            name: name.to_owned(),
            parent: None,
            mode,
            ctime,
            kind,
        };
        self.inner.lock().alloc(entry)
    }

    /// 将游离条目挂到父目录（None 表示根目录）的子序列末尾，返回其索引
    ///
    /// # Panics
    /// index 或父索引不存在、父条目不是目录、条目已被挂接时 panic
    /// （均属登记器的编程错误，不是可恢复条件）。
    pub fn attach(&self, index: EntryIndex, parent: Option<EntryIndex>) -> EntryIndex {
        let parent_index = parent.unwrap_or(ROOT_INDEX);
        let mut inner = self.inner.lock();

        {
            let entry = inner
                .entry(index)
                .unwrap_or_else(|| panic!("procfs: attach of non-existent entry {index}"));
            assert!(
                entry.parent.is_none(),
                "procfs: entry {index} already attached"
            );
        }

        match inner.entry_mut(parent_index) {
            Some(Entry {
                kind: EntryKind::Directory { children },
                ..
            }) => children.push(index),
            Some(_) => panic!("procfs: attach target {parent_index} is not a directory"),
            None => panic!("procfs: attach to non-existent parent {parent_index}"),
        }

        inner
            .entry_mut(index)
            .expect("entry checked above")
            .parent = Some(parent_index);
        index
    }

    /// 摘除条目并释放其索引；目录会先递归释放全部后代
    ///
    /// 返回是否成功（恒为 true；保留返回值供调用方断言）。
    ///
    /// # Panics
    /// index 不存在或为根目录时 panic（编程错误，不是可恢复条件）。
    pub fn detach(&self, index: EntryIndex) -> bool {
        assert_ne!(index, ROOT_INDEX, "procfs: root directory cannot be detached");
        let mut inner = self.inner.lock();

        let parent = match inner.entry(index) {
            Some(entry) => entry.parent,
            None => panic!("procfs: detach of non-existent entry {index}"),
        };

        // 从父目录的子序列摘除
        if let Some(parent_index) = parent {
            if let Some(children) = inner
                .entry_mut(parent_index)
                .and_then(|p| match &mut p.kind {
                    EntryKind::Directory { children } => Some(children),
                    EntryKind::Generated { .. } => None,
                })
            {
                children.retain(|&child| child != index);
            }
        }

        // 先序收集子树，逆序释放：后代先于条目本身归还空闲表
        let mut order = Vec::new();
        let mut pending = Vec::new();
        pending.push(index);
        while let Some(current) = pending.pop() {
            order.push(current);
            if let Some(children) = inner.entry(current).and_then(Entry::children) {
                pending.extend(children.iter().copied());
            }
        }
        for &released in order.iter().rev() {
            inner.slots[released] = None;
            inner.free.push(released);
        }

        log::trace!("procfs: detached entry {} ({} slots freed)", index, order.len());
        true
    }

    /// 存活条目数（含根目录）
    pub fn live_entries(&self) -> usize {
        self.inner.lock().slots.iter().flatten().count()
    }

    /// 获取条目元数据；条目已释放时返回 NotFound
    ///
    /// 符号链接的 size 由调用方按目标路径长度补齐。
    pub fn metadata(&self, index: EntryIndex) -> Result<InodeMetadata, FsError> {
        let inner = self.inner.lock();
        let entry = inner.entry(index).ok_or(FsError::NotFound)?;
        let inode_type = entry.inode_type();
        Ok(InodeMetadata {
            inode_no: index,
            inode_type,
            mode: entry.mode,
            uid: 0,
            gid: 0,
            size: 0,
            atime: entry.ctime,
            mtime: entry.ctime,
            ctime: entry.ctime,
            nlinks: if inode_type == InodeType::Directory { 2 } else { 1 },
        })
    }

    /// 在目录中按名查找子条目
    pub fn lookup_child(&self, dir: EntryIndex, name: &str) -> Result<EntryIndex, FsError> {
        let inner = self.inner.lock();
        let entry = inner.entry(dir).ok_or(FsError::NotFound)?;
        let children = entry.children().ok_or(FsError::NotDirectory)?;
        children
            .iter()
            .copied()
            .find(|&child| inner.entry(child).is_some_and(|c| c.name == name))
            .ok_or(FsError::NotFound)
    }

    /// 列出目录项（`.`、`..` 及按创建顺序排列的子条目）
    pub fn read_dir(&self, dir: EntryIndex) -> Result<Vec<DirEntry>, FsError> {
        let inner = self.inner.lock();
        let entry = inner.entry(dir).ok_or(FsError::NotFound)?;
        let children = entry.children().ok_or(FsError::NotDirectory)?;

        let mut entries = Vec::with_capacity(children.len() + 2);
        entries.push(DirEntry {
            name: ".".to_owned(),
            inode_no: dir,
            inode_type: InodeType::Directory,
        });
        entries.push(DirEntry {
            name: "..".to_owned(),
            inode_no: entry.parent.unwrap_or(dir),
            inode_type: InodeType::Directory,
        });
        for &child in children {
            if let Some(child_entry) = inner.entry(child) {
                entries.push(DirEntry {
                    name: child_entry.name.clone(),
                    inode_no: child,
                    inode_type: child_entry.inode_type(),
                });
            }
        }
        Ok(entries)
    }

    /// 条目的 mode 位
    pub fn mode(&self, index: EntryIndex) -> Result<FileMode, FsError> {
        let inner = self.inner.lock();
        Ok(inner.entry(index).ok_or(FsError::NotFound)?.mode)
    }

    /// 读取生成文件的内容
    ///
    /// 生成器在树锁之外调用，允许其自行获取临界区和检查作用域。
    pub fn generate(&self, index: EntryIndex) -> Result<Vec<u8>, FsError> {
        let producer = self.producer(index)?;
        producer.generate()
    }

    /// 读取符号链接条目的目标路径
    pub fn readlink_target(&self, index: EntryIndex) -> Result<String, FsError> {
        if !self.mode(index)?.is_symlink() {
            return Err(FsError::InvalidArgument);
        }
        let bytes = self.generate(index)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn producer(&self, index: EntryIndex) -> Result<Arc<dyn ContentGenerator>, FsError> {
        let inner = self.inner.lock();
        let entry = inner.entry(index).ok_or(FsError::NotFound)?;
        match &entry.kind {
            EntryKind::Generated { producer } => Ok(producer.clone()),
            EntryKind::Directory { .. } => Err(FsError::IsDirectory),
        }
    }
}

impl Default for SynthTree {
    fn default() -> Self {
        Self::new()
    }
}
