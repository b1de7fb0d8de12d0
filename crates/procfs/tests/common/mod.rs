//! 集成测试共用的 Mock 内核环境
//!
//! 提供实现 `ProcOps`/`TaskInfo` 的内存版进程表，以及实现 `sync::ArchOps`
//! 的中断状态模拟。注册是进程级一次性的（`Once`），各测试通过互不重叠
//! 的 pid 使用共享的任务表。

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use procfs::{
    CpuidRegs, KmallocStats, MemoryRegionInfo, MountHost, MountInfo, ProcOps, SymbolInfo,
    TaskInfo, TaskState,
};
use uapi::time::TimeSpec;

/// Mock 架构操作（中断状态模拟）
pub struct TestArchOps {
    interrupt_state: AtomicBool,
}

impl sync::ArchOps for TestArchOps {
    unsafe fn read_and_disable_interrupts(&self) -> usize {
        if self.interrupt_state.swap(false, Ordering::SeqCst) {
            self.intr_enable_bit()
        } else {
            0
        }
    }

    unsafe fn restore_interrupts(&self, flags: usize) {
        self.interrupt_state.store(flags != 0, Ordering::SeqCst);
    }

    fn intr_enable_bit(&self) -> usize {
        0x2
    }
}

static TEST_ARCH_OPS: TestArchOps = TestArchOps {
    interrupt_state: AtomicBool::new(true),
};

/// Mock 任务
#[derive(Clone)]
pub struct MockTask {
    pub pid: u32,
    pub ppid: u32,
    pub pgid: u32,
    pub sid: u32,
    pub uid: u32,
    pub name: String,
    pub state: TaskState,
    pub tty: Option<(u32, String)>,
    pub times_scheduled: u64,
    pub fds: Vec<Option<String>>,
    pub exe: Option<String>,
    pub regions: Vec<MemoryRegionInfo>,
    pub ip: usize,
    pub fp: usize,
}

impl MockTask {
    pub fn new(pid: u32) -> Self {
        MockTask {
            pid,
            ppid: 1,
            pgid: pid,
            sid: pid,
            uid: 0,
            name: format!("task{pid}"),
            state: TaskState::Running,
            tty: None,
            times_scheduled: 0,
            fds: Vec::new(),
            exe: None,
            regions: Vec::new(),
            ip: 0,
            fp: 0,
        }
    }
}

impl TaskInfo for MockTask {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn ppid(&self) -> u32 {
        self.ppid
    }

    fn pgid(&self) -> u32 {
        self.pgid
    }

    fn sid(&self) -> u32 {
        self.sid
    }

    fn uid(&self) -> u32 {
        self.uid
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn state(&self) -> TaskState {
        self.state
    }

    fn tty_pgid(&self) -> Option<u32> {
        self.tty.as_ref().map(|(pgid, _)| *pgid)
    }

    fn tty_name(&self) -> Option<String> {
        self.tty.as_ref().map(|(_, name)| name.clone())
    }

    fn times_scheduled(&self) -> u64 {
        self.times_scheduled
    }

    fn descriptor_slots(&self) -> Vec<Option<String>> {
        self.fds.clone()
    }

    fn exe_path(&self) -> Option<String> {
        self.exe.clone()
    }

    fn memory_regions(&self) -> Vec<MemoryRegionInfo> {
        self.regions.clone()
    }

    fn saved_instruction_pointer(&self) -> usize {
        self.ip
    }

    fn saved_frame_pointer(&self) -> usize {
        self.fp
    }
}

/// 每个内核符号在 Mock 中占据的地址跨度
const SYMBOL_SPAN: usize = 0x100;

/// Mock 内核环境
pub struct MockKernel {
    pub tasks: Mutex<BTreeMap<u32, MockTask>>,
    pub current_pid: u32,
    pub words: Mutex<BTreeMap<usize, usize>>,
    pub symbols: Vec<SymbolInfo>,
    pub kernel_range: core::ops::Range<usize>,
    pub kmalloc: Mutex<KmallocStats>,
    pub mounts: Vec<MountInfo>,
    pub cpuid_table: BTreeMap<u32, CpuidRegs>,
    pub pin_depth: AtomicUsize,
    pub paging_depth: AtomicUsize,
}

impl MockKernel {
    fn new() -> Self {
        MockKernel {
            tasks: Mutex::new(BTreeMap::new()),
            current_pid: 5,
            words: Mutex::new(BTreeMap::new()),
            symbols: vec![
                SymbolInfo {
                    address: 0x8020_1000,
                    name: "schedule".into(),
                },
                SymbolInfo {
                    address: 0x8020_3000,
                    name: "sys_read".into(),
                },
                SymbolInfo {
                    address: 0x8020_5000,
                    name: "timer_tick".into(),
                },
            ],
            kernel_range: 0x8020_0000..0x8800_0000,
            kmalloc: Mutex::new(KmallocStats {
                eternal: 1111,
                page_aligned: 2222,
                allocated: 3333,
                free: 4444,
            }),
            mounts: vec![
                MountInfo {
                    fs_name: "ext4".into(),
                    host: None,
                },
                MountInfo {
                    fs_name: "procfs".into(),
                    host: Some(MountHost { fsid: 3, inode: 42 }),
                },
            ],
            cpuid_table: build_cpuid_table(),
            pin_depth: AtomicUsize::new(0),
            paging_depth: AtomicUsize::new(0),
        }
    }

    pub fn add_task(&self, task: MockTask) {
        self.tasks.lock().unwrap().insert(task.pid, task);
    }

    pub fn remove_task(&self, pid: u32) {
        self.tasks.lock().unwrap().remove(&pid);
    }

    pub fn put_word(&self, addr: usize, value: usize) {
        self.words.lock().unwrap().insert(addr, value);
    }
}

fn build_cpuid_table() -> BTreeMap<u32, CpuidRegs> {
    let mut table = BTreeMap::new();
    // 叶 0: "GenuineIntel"
    table.insert(
        0,
        CpuidRegs {
            eax: 0xd,
            ebx: 0x756e_6547, // "Genu"
            ecx: 0x6c65_746e, // "ntel"
            edx: 0x4965_6e69, // "ineI"
        },
    );
    // 叶 1: 家族 6、型号 10、扩展型号 3、步进 2
    table.insert(
        1,
        CpuidRegs {
            eax: 0x2 | (10 << 4) | (6 << 8) | (3 << 16),
            ..CpuidRegs::default()
        },
    );
    // 扩展叶: 品牌串（48 字节，NUL 填充）
    let mut brand = [0u8; 48];
    let text = b"Mock Virtual CPU @ 1.00GHz";
    brand[..text.len()].copy_from_slice(text);
    for (i, chunk) in brand.chunks(16).enumerate() {
        table.insert(
            0x8000_0002 + i as u32,
            CpuidRegs {
                eax: u32::from_le_bytes(chunk[0..4].try_into().unwrap()),
                ebx: u32::from_le_bytes(chunk[4..8].try_into().unwrap()),
                ecx: u32::from_le_bytes(chunk[8..12].try_into().unwrap()),
                edx: u32::from_le_bytes(chunk[12..16].try_into().unwrap()),
            },
        );
    }
    table
}

impl ProcOps for MockKernel {
    fn timespec_now(&self) -> TimeSpec {
        TimeSpec {
            tv_sec: 1000,
            tv_nsec: 0,
        }
    }

    fn get_task(&self, pid: u32) -> Option<Arc<dyn TaskInfo>> {
        self.tasks
            .lock()
            .unwrap()
            .get(&pid)
            .cloned()
            .map(|task| Arc::new(task) as Arc<dyn TaskInfo>)
    }

    fn list_process_pids(&self) -> Vec<u32> {
        self.tasks.lock().unwrap().keys().copied().collect()
    }

    fn current_task_pid(&self) -> u32 {
        self.current_pid
    }

    fn pin_task(&self, _pid: u32) {
        self.pin_depth.fetch_add(1, Ordering::SeqCst);
    }

    fn unpin_task(&self, _pid: u32) {
        self.pin_depth.fetch_sub(1, Ordering::SeqCst);
    }

    fn enter_address_space(&self, _pid: u32) -> usize {
        self.paging_depth.fetch_add(1, Ordering::SeqCst)
    }

    fn leave_address_space(&self, _token: usize) {
        self.paging_depth.fetch_sub(1, Ordering::SeqCst);
    }

    fn is_kernel_addr(&self, addr: usize) -> bool {
        self.kernel_range.contains(&addr)
    }

    unsafe fn read_kernel_word(&self, addr: usize) -> usize {
        self.words.lock().unwrap().get(&addr).copied().unwrap_or(0)
    }

    fn symbolicate(&self, addr: usize) -> Option<SymbolInfo> {
        self.symbols
            .iter()
            .find(|sym| addr >= sym.address && addr < sym.address + SYMBOL_SPAN)
            .cloned()
    }

    fn cpuid(&self, leaf: u32) -> CpuidRegs {
        self.cpuid_table.get(&leaf).copied().unwrap_or_default()
    }

    fn kmalloc_stats(&self) -> KmallocStats {
        *self.kmalloc.lock().unwrap()
    }

    fn total_frames(&self) -> usize {
        8192
    }

    fn free_frames(&self) -> usize {
        1024
    }

    fn list_mounts(&self) -> Vec<MountInfo> {
        self.mounts.clone()
    }
}

/// 获取（并在首次调用时注册）全局 Mock 内核
pub fn kernel() -> &'static MockKernel {
    static KERNEL: OnceLock<&'static MockKernel> = OnceLock::new();
    *KERNEL.get_or_init(|| {
        let kernel: &'static MockKernel = Box::leak(Box::new(MockKernel::new()));
        // Safety: one-time registration against process-global mocks.
        unsafe {
            sync::register_arch_ops(&TEST_ARCH_OPS);
            procfs::register_proc_ops(kernel);
        }
        kernel
    })
}
