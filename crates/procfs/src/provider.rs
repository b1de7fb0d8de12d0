//! 惰性内容生成协议
//!
//! 合成文件不存储内容：每次读取都同步调用生成器重新计算，两次读取之间
//! 不做任何缓存——条目是内核状态的**活视图**，这是有意为之。

use alloc::vec::Vec;
use core::fmt;

use vfs::FsError;

/// 动态内容生成器 trait
pub trait ContentGenerator: Send + Sync {
    /// 生成文件内容（每次调用时重新生成）
    fn generate(&self) -> Result<Vec<u8>, FsError>;
}

/// 生成器共用的可增长输出缓冲区
///
/// 生成器先给出输出大小的上界估计并一次性预留容量，随后通过
/// [`core::fmt::Write`] 逐段写入，最终 [`OutBuf::into_bytes`] 交出的
/// 字节数与实际写入量精确一致，不含预留产生的尾部垃圾。
pub struct OutBuf {
    buf: Vec<u8>,
}

impl OutBuf {
    /// 按估计的上界预留容量创建缓冲区
    ///
    /// 预留失败（内存不足）时返回 None，调用方应降级为返回空内容，
    /// 而不是让读取路径崩溃。
    pub fn with_estimate(estimate: usize) -> Option<Self> {
        let mut buf = Vec::new();
        if buf.try_reserve(estimate).is_err() {
            return None;
        }
        Some(OutBuf { buf })
    }

    /// 已写入的字节数
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// 是否尚未写入任何内容
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// 追加原始字节
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// 交出精确长度的内容
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl fmt::Write for OutBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }
}
