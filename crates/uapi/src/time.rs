//! 时间相关类型定义

/// POSIX `struct timespec`
///
/// 秒 + 纳秒的时间表示，用于 inode 时间戳和系统调用参数。
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSpec {
    /// 秒
    pub tv_sec: i64,
    /// 纳秒 (0..=999_999_999)
    pub tv_nsec: i64,
}

impl TimeSpec {
    /// 零时刻
    pub const ZERO: TimeSpec = TimeSpec {
        tv_sec: 0,
        tv_nsec: 0,
    };

    /// 由毫秒构造
    pub fn from_ms(ms: u64) -> Self {
        TimeSpec {
            tv_sec: (ms / 1000) as i64,
            tv_nsec: ((ms % 1000) * 1_000_000) as i64,
        }
    }

    /// 转换为毫秒
    pub fn to_ms(&self) -> u64 {
        self.tv_sec as u64 * 1000 + self.tv_nsec as u64 / 1_000_000
    }
}
