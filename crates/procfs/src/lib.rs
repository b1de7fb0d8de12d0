//! ProcFS - 进程信息伪文件系统
//!
//! 该 crate 提供一个**合成文件系统**：目录树中的文件内容不由存储承载，
//! 而是在每次读取时由生成器即时计算，用于导出内核与进程的诊断状态
//! （进程概览、内存映射、内核调用栈、描述符表、CPU 信息、分配器计数等）。
//!
//! # 组成
//!
//! - [`SynthTree`] - 以稳定索引（inode 号）寻址的合成目录树
//! - [`ContentGenerator`] / [`OutBuf`] - 惰性内容生成协议
//! - [`ProcessRegistrar`] - 随进程创建/销毁同步维护 per-PID 子树
//! - [`ProcessInspectionScope`] / [`ProcessPagingScope`] - 跨进程检查的快照保护
//! - [`generators`] - 各诊断文件的内容生成器
//! - [`ProcFS`] - 挂接到 VFS 层的文件系统对象（类型名 `"procfs"`）
//!
//! # 外部依赖
//!
//! 对进程表、内存管理器、内核符号表等只读协作者的访问通过 [`ProcOps`]
//! trait 抽象，内核主 crate 启动时调用 [`register_proc_ops`] 注册实现。

#![no_std]

extern crate alloc;

pub mod generators;
mod inode;
pub mod ops;
mod proc;
mod provider;
mod registrar;
mod scope;
mod tree;

pub use inode::ProcInode;
pub use ops::{
    proc_ops, register_proc_ops, CpuidRegs, KmallocStats, MemoryRegionInfo, MountHost, MountInfo,
    PhysPageInfo, ProcOps, SymbolInfo, TaskInfo, TaskState,
};
pub use proc::ProcFS;
pub use provider::{ContentGenerator, OutBuf};
pub use registrar::ProcessRegistrar;
pub use scope::{ProcessInspectionScope, ProcessPagingScope};
pub use tree::{EntryIndex, SynthTree, ROOT_INDEX};
