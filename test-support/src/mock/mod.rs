//! Mock 实现集合
//!
//! 注意：这里不直接依赖具体的内核 crate（避免循环依赖）。
//! 各 crate 在 `cfg(test)` 下为这些类型实现自己的 trait（例如 `ArchOps`）。

mod arch;

pub use arch::{MockArchOps, MOCK_ARCH_OPS};
