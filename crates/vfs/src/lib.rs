//! 内核虚拟文件系统层
//!
//! 此 crate 提供 POSIX 兼容的虚拟文件系统抽象，包括：
//!
//! - [`Inode`] trait - 索引节点接口
//! - [`FileSystem`] trait - 文件系统接口
//! - [`FileMode`] / [`InodeMetadata`] / [`DirEntry`] - 元数据类型
//! - [`FsError`] - 错误类型

#![no_std]

extern crate alloc;

mod error;
mod file_system;
mod inode;

// Re-export error
pub use error::FsError;

// Re-export inode
pub use inode::{DirEntry, FileMode, Inode, InodeMetadata, InodeType};

// Re-export file_system
pub use file_system::{FileSystem, StatFs};

// Re-export uapi types for convenience
pub use uapi::time::TimeSpec;
