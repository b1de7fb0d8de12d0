//! ProcFS 运行时操作 trait 定义和注册
//!
//! 此模块定义了 procfs 层需要的外部依赖接口，通过 trait 抽象实现与内核主
//! crate 的解耦。所有接口均为只读查询：procfs 不修改协作者的任何状态
//! （进程检查 pin 与地址空间切换除外，二者由 RAII 作用域成对恢复）。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use uapi::time::TimeSpec;

/// ProcFS 运行时操作
///
/// 此 trait 抽象了 procfs 层需要的运行时操作：时间、进程表、跨进程
/// 内存检查以及各类系统信息查询。内核主 crate 需要实现此 trait 并在
/// 启动时注册。
pub trait ProcOps: Send + Sync {
    // ========== 时间 ==========

    /// 获取当前时间
    fn timespec_now(&self) -> TimeSpec;

    // ========== 进程表 ==========

    /// 获取指定 PID 的任务信息
    fn get_task(&self, pid: u32) -> Option<Arc<dyn TaskInfo>>;

    /// 按进程表顺序列出所有进程 PID
    fn list_process_pids(&self) -> Vec<u32>;

    /// 获取当前任务的 PID（用于 `/proc/self`）
    fn current_task_pid(&self) -> u32;

    // ========== 进程检查 ==========

    /// 钉住指定进程，阻止其在检查期间被销毁或释放资源
    fn pin_task(&self, pid: u32);

    /// 解除 [`ProcOps::pin_task`] 的钉住
    fn unpin_task(&self, pid: u32);

    /// 激活指定进程的地址翻译上下文，返回先前上下文的令牌
    fn enter_address_space(&self, pid: u32) -> usize;

    /// 恢复 [`ProcOps::enter_address_space`] 保存的地址翻译上下文
    fn leave_address_space(&self, token: usize);

    // ========== 内核地址与符号 ==========

    /// 判断地址是否落在有效的内核地址范围内
    fn is_kernel_addr(&self, addr: usize) -> bool;

    /// 读取内核地址处的一个机器字
    ///
    /// # Safety
    /// addr 必须已通过 [`ProcOps::is_kernel_addr`] 校验，且调用发生在
    /// 目标进程的分页作用域内。
    unsafe fn read_kernel_word(&self, addr: usize) -> usize;

    /// 按地址解析内核符号
    fn symbolicate(&self, addr: usize) -> Option<SymbolInfo>;

    // ========== 系统信息 ==========

    /// 执行 CPU 识别查询，返回四个 32 位寄存器值
    fn cpuid(&self, leaf: u32) -> CpuidRegs;

    /// 读取内核堆分配器计数
    fn kmalloc_stats(&self) -> KmallocStats;

    /// 获取总物理页帧数
    fn total_frames(&self) -> usize;

    /// 获取空闲物理页帧数
    fn free_frames(&self) -> usize;

    /// 获取挂载点列表
    fn list_mounts(&self) -> Vec<MountInfo>;
}

/// 内核符号信息
///
/// `address` 为符号起始地址，查询地址总是不小于它。
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    /// 符号起始地址
    pub address: usize,
    /// 符号名
    pub name: String,
}

/// CPU 识别查询结果
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuidRegs {
    /// EAX 寄存器值
    pub eax: u32,
    /// EBX 寄存器值
    pub ebx: u32,
    /// ECX 寄存器值
    pub ecx: u32,
    /// EDX 寄存器值
    pub edx: u32,
}

/// 内核堆分配器计数
#[derive(Debug, Clone, Copy, Default)]
pub struct KmallocStats {
    /// 永久分配字节数（不可回收）
    pub eternal: usize,
    /// 页对齐分配字节数
    pub page_aligned: usize,
    /// 当前已分配字节数
    pub allocated: usize,
    /// 当前空闲字节数
    pub free: usize,
}

/// 挂载点信息（用于 `/proc/mounts`）
#[derive(Debug, Clone)]
pub struct MountInfo {
    /// 文件系统类型名称
    pub fs_name: String,
    /// 宿主节点；根挂载点为 None
    pub host: Option<MountHost>,
}

/// 挂载点的宿主节点标识
#[derive(Debug, Clone, Copy)]
pub struct MountHost {
    /// 宿主文件系统 ID
    pub fsid: u32,
    /// 宿主 inode 号
    pub inode: usize,
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// 就绪
    Runnable,
    /// 运行中
    Running,
    /// 睡眠
    Sleeping,
    /// 已停止
    Stopped,
    /// 僵尸
    Zombie,
    /// 已终止
    Dead,
}

impl TaskState {
    /// 获取状态名称
    pub fn name(self) -> &'static str {
        match self {
            TaskState::Runnable => "Runnable",
            TaskState::Running => "Running",
            TaskState::Sleeping => "Sleeping",
            TaskState::Stopped => "Stopped",
            TaskState::Zombie => "Zombie",
            TaskState::Dead => "Dead",
        }
    }
}

/// 任务信息接口（用于 procfs）
///
/// 实现方返回的都是查询瞬间的快照值；一致性由调用方持有的保护作用域保证。
pub trait TaskInfo: Send + Sync {
    /// 获取进程 ID
    fn pid(&self) -> u32;

    /// 获取父进程 ID
    fn ppid(&self) -> u32;

    /// 获取进程组 ID
    fn pgid(&self) -> u32;

    /// 获取会话 ID
    fn sid(&self) -> u32;

    /// 获取属主用户 ID
    fn uid(&self) -> u32;

    /// 获取进程名称
    fn name(&self) -> String;

    /// 获取进程状态
    fn state(&self) -> TaskState;

    /// 获取控制终端的进程组 ID（无控制终端时为 None）
    fn tty_pgid(&self) -> Option<u32>;

    /// 获取控制终端的短名（如 `tty0`；无控制终端时为 None）
    fn tty_name(&self) -> Option<String>;

    /// 获取被调度次数
    fn times_scheduled(&self) -> u64;

    /// 获取描述符表的槽位视图：占用槽为解析后的绝对路径，空槽为 None
    fn descriptor_slots(&self) -> Vec<Option<String>>;

    /// 获取打开描述符数
    fn open_descriptor_count(&self) -> usize {
        self.descriptor_slots().iter().filter(|s| s.is_some()).count()
    }

    /// 获取可执行文件的解析后绝对路径（无有效可执行文件时为 None）
    fn exe_path(&self) -> Option<String>;

    /// 获取内存区域信息（用于 `/proc/[pid]/vm`）
    fn memory_regions(&self) -> Vec<MemoryRegionInfo>;

    /// 获取保存的指令指针（任务切换时留存的执行现场）
    fn saved_instruction_pointer(&self) -> usize;

    /// 获取保存的帧指针
    fn saved_frame_pointer(&self) -> usize;
}

/// 内存区域信息（用于 procfs `/proc/[pid]/vm`）
#[derive(Debug, Clone)]
pub struct MemoryRegionInfo {
    /// 起始地址
    pub start: usize,
    /// 区域大小（字节）
    pub size: usize,
    /// 区域名称
    pub name: String,
    /// 逐页的物理页信息
    pub pages: Vec<PhysPageInfo>,
}

/// 单个虚拟页的物理支撑信息
#[derive(Debug, Clone, Copy)]
pub struct PhysPageInfo {
    /// 物理地址；未映射时为 0
    pub paddr: usize,
    /// 是否标记为写时复制
    pub cow: bool,
    /// 物理页引用计数
    pub ref_count: usize,
}

// ========== ProcOps 注册 ==========

static PROC_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static PROC_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

/// 注册 procfs 运行时操作实现
///
/// # Safety
/// 必须在单线程环境下调用，且只能调用一次
pub unsafe fn register_proc_ops(ops: &'static dyn ProcOps) {
    let ptr = ops as *const dyn ProcOps;
    // SAFETY: fat pointer 的布局是 (data, vtable)
    let (data, vtable) = unsafe { core::mem::transmute::<*const dyn ProcOps, (usize, usize)>(ptr) };
    PROC_OPS_DATA.store(data, Ordering::Release);
    PROC_OPS_VTABLE.store(vtable, Ordering::Release);
}

/// 获取已注册的 procfs 运行时操作实现
///
/// # Panics
/// 如果尚未调用 [`register_proc_ops`] 注册实现，则 panic
#[inline]
pub fn proc_ops() -> &'static dyn ProcOps {
    let data = PROC_OPS_DATA.load(Ordering::Acquire);
    let vtable = PROC_OPS_VTABLE.load(Ordering::Acquire);
    if data == 0 {
        panic!("procfs: ProcOps not registered");
    }
    // SAFETY: 重组 fat pointer
    unsafe { &*core::mem::transmute::<(usize, usize), *const dyn ProcOps>((data, vtable)) }
}
