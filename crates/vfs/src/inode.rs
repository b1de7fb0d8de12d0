//! Inode 抽象层 - VFS 存储层接口
//!
//! 该模块定义了文件系统的底层存储接口，提供无状态的文件和目录访问能力。
//!
//! `Inode` 侧接口以"显式 offset"的随机访问为主，因此可以被多个打开会话共享；
//! 打开状态（offset、flags 等）由上层会话对象维护。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use uapi::time::TimeSpec;

use crate::FsError;

/// 文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeType {
    /// 普通文件
    File,
    /// 目录
    Directory,
    /// 符号链接
    Symlink,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// 文件权限和类型（与 POSIX 兼容）
    pub struct FileMode: u32 {
        // 文件类型掩码
        /// 文件类型掩码
        const S_IFMT   = 0o170000;
        /// 普通文件
        const S_IFREG  = 0o100000;
        /// 目录
        const S_IFDIR  = 0o040000;
        /// 符号链接
        const S_IFLNK  = 0o120000;

        // 用户权限
        /// 用户读
        const S_IRUSR  = 0o400;
        /// 用户写
        const S_IWUSR  = 0o200;
        /// 用户执行
        const S_IXUSR  = 0o100;

        // 组权限
        /// 组读
        const S_IRGRP  = 0o040;
        /// 组写
        const S_IWGRP  = 0o020;
        /// 组执行
        const S_IXGRP  = 0o010;

        // 其他用户权限
        /// 其他读
        const S_IROTH  = 0o004;
        /// 其他写
        const S_IWOTH  = 0o002;
        /// 其他执行
        const S_IXOTH  = 0o001;
    }
}

impl FileMode {
    /// 由类型位推导文件类型
    ///
    /// 类型位未设置或不被支持时返回 None。
    pub fn inode_type(&self) -> Option<InodeType> {
        match self.bits() & Self::S_IFMT.bits() {
            x if x == Self::S_IFDIR.bits() => Some(InodeType::Directory),
            x if x == Self::S_IFLNK.bits() => Some(InodeType::Symlink),
            x if x == Self::S_IFREG.bits() => Some(InodeType::File),
            _ => None,
        }
    }

    /// 是否为符号链接
    pub fn is_symlink(&self) -> bool {
        self.bits() & Self::S_IFMT.bits() == Self::S_IFLNK.bits()
    }
}

/// Inode 元数据
#[derive(Debug, Clone)]
pub struct InodeMetadata {
    /// inode 编号
    pub inode_no: usize,
    /// 文件类型
    pub inode_type: InodeType,
    /// 权限和类型位
    pub mode: FileMode,
    /// 属主用户 ID
    pub uid: u32,
    /// 属主组 ID
    pub gid: u32,
    /// 文件大小（字节）
    pub size: usize,
    /// 访问时间
    pub atime: TimeSpec,
    /// 修改时间
    pub mtime: TimeSpec,
    /// 状态变更时间
    pub ctime: TimeSpec,
    /// 硬链接数
    pub nlinks: usize,
}

/// 目录项
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// 项名
    pub name: String,
    /// inode 编号
    pub inode_no: usize,
    /// 文件类型
    pub inode_type: InodeType,
}

/// Inode trait
///
/// 文件系统实现向 VFS 层暴露的单个节点接口。
/// 写方向的操作提供默认的拒绝实现，只读文件系统仅需实现读方向。
pub trait Inode: Send + Sync {
    /// 获取元数据
    fn metadata(&self) -> Result<InodeMetadata, FsError>;

    /// 从指定偏移读取内容
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize, FsError>;

    /// 向指定偏移写入内容
    fn write_at(&self, _offset: usize, _buf: &[u8]) -> Result<usize, FsError> {
        Err(FsError::PermissionDenied)
    }

    /// 在目录中查找子节点
    fn lookup(&self, _name: &str) -> Result<Arc<dyn Inode>, FsError> {
        Err(FsError::NotDirectory)
    }

    /// 列出目录项
    fn readdir(&self) -> Result<Vec<DirEntry>, FsError> {
        Err(FsError::NotDirectory)
    }

    /// 读取符号链接目标
    fn readlink(&self) -> Result<String, FsError> {
        Err(FsError::InvalidArgument)
    }

    /// 创建普通文件
    fn create(&self, _name: &str, _mode: FileMode) -> Result<Arc<dyn Inode>, FsError> {
        Err(FsError::PermissionDenied)
    }

    /// 创建子目录
    fn mkdir(&self, _name: &str, _mode: FileMode) -> Result<Arc<dyn Inode>, FsError> {
        Err(FsError::PermissionDenied)
    }

    /// 删除子节点
    fn unlink(&self, _name: &str) -> Result<(), FsError> {
        Err(FsError::PermissionDenied)
    }

    /// 截断文件
    fn truncate(&self, _size: usize) -> Result<(), FsError> {
        Err(FsError::PermissionDenied)
    }

    /// 同步到存储
    fn sync(&self) -> Result<(), FsError> {
        Ok(())
    }

    /// 向下转换支持
    fn as_any(&self) -> &dyn Any;
}
