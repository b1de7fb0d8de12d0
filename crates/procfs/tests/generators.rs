mod common;

use common::{kernel, MockTask};
use procfs::{MemoryRegionInfo, PhysPageInfo, ProcFS};
use vfs::{FileSystem, Inode};

fn read_all(inode: &dyn Inode) -> String {
    let mut buf = [0u8; 4096];
    let n = inode.read_at(0, &mut buf).unwrap();
    String::from_utf8_lossy(&buf[..n]).into_owned()
}

fn read_root_file(fs: &ProcFS, name: &str) -> String {
    let inode = fs.root_inode().lookup(name).unwrap();
    read_all(inode.as_ref())
}

fn read_pid_file(fs: &ProcFS, pid: u32, name: &str) -> String {
    let inode = fs
        .root_inode()
        .lookup(&pid.to_string())
        .unwrap()
        .lookup(name)
        .unwrap();
    read_all(inode.as_ref())
}

#[test]
fn test_summary_single_process_row() {
    let kernel = kernel();
    let mut task = MockTask::new(7);
    task.name = "shell".into();
    task.fds = vec![
        Some("/dev/null".into()),
        Some("/dev/null".into()),
        Some("/home/log".into()),
    ];
    kernel.add_task(task.clone());

    let fs = ProcFS::new();
    fs.register_task(&task);
    let content = read_root_file(&fs, "summary");

    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "PID TPG PGP SID  OWNER  STATE      PPID NSCHED     FDS  TTY  NAME"
    );
    let expected = "  7   0   7   7     0    Running     1          0    3   n/a  shell";
    assert!(
        content.lines().any(|line| line == expected),
        "missing row {expected:?} in {content:?}"
    );

    fs.deregister_task(7);
    kernel.remove_task(7);
}

#[test]
fn test_cpuinfo_vendor_and_decoding() {
    kernel();
    let fs = ProcFS::new();
    let content = read_root_file(&fs, "cpuinfo");

    assert!(content.contains("cpuid:     GenuineIntel\n"));
    assert!(content.contains("family:    6\n"));
    // 型号 10 + (扩展型号 3 << 4) = 58
    assert!(content.contains("model:     58\n"));
    assert!(content.contains("stepping:  2\n"));
    assert!(content.contains("type:      0\n"));
    assert!(content.contains("brandstr:  \"Mock Virtual CPU @ 1.00GHz\"\n"));
}

#[test]
fn test_kmalloc_counters_are_live() {
    let kernel = kernel();
    let fs = ProcFS::new();

    let first = read_root_file(&fs, "kmalloc");
    assert!(first.contains("eternal:      1111\n"));
    assert!(first.contains("page-aligned: 2222\n"));
    assert!(first.contains("allocated:    3333\n"));

    kernel.kmalloc.lock().unwrap().free += 100;
    let second = read_root_file(&fs, "kmalloc");
    // 不做跨读取的一致性保证：两次读取合法地看到不同的值
    assert_ne!(first, second);
}

#[test]
fn test_mounts_lines() {
    kernel();
    let fs = ProcFS::new();
    let content = read_root_file(&fs, "mounts");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec!["ext4 @ /", "procfs @ 3:42"]);
}

#[test]
fn test_mm_frame_counts() {
    kernel();
    let fs = ProcFS::new();
    let content = read_root_file(&fs, "mm");
    assert!(content.contains("Total physical pages: 8192\n"));
    assert!(content.contains("Free physical pages:  1024\n"));
}

#[test]
fn test_self_link_targets_current_pid() {
    kernel();
    let fs = ProcFS::new();
    let link = fs.root_inode().lookup("self").unwrap();
    assert_eq!(link.readlink().unwrap(), "5");
}

#[test]
fn test_vm_regions_and_page_tokens() {
    let kernel = kernel();
    let mut task = MockTask::new(701);
    task.regions = vec![MemoryRegionInfo {
        start: 0x10000,
        size: 0x2000,
        name: "stack".into(),
        pages: vec![
            PhysPageInfo {
                paddr: 0x8000_1000,
                cow: false,
                ref_count: 1,
            },
            PhysPageInfo {
                paddr: 0,
                cow: true,
                ref_count: 0,
            },
        ],
    }];
    kernel.add_task(task.clone());

    let fs = ProcFS::new();
    fs.register_task(&task);
    let content = read_pid_file(&fs, 701, "vm");

    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "BEGIN       END         SIZE        NAME");
    assert_eq!(lines[1], "10000 -- 11fff    2000    stack");
    assert_eq!(lines[2], "P80001000(1) P0!(0) ");

    fs.deregister_task(701);
    kernel.remove_task(701);
}

#[test]
fn test_stack_walk_follows_frame_chain() {
    let kernel = kernel();
    let mut task = MockTask::new(702);
    task.ip = 0x8020_1010; // schedule +16
    task.fp = 0x8025_0000;
    kernel.add_task(task.clone());
    // 帧: 返回地址 sys_read+8，上一帧指针离开内核地址范围
    let word = core::mem::size_of::<usize>();
    kernel.put_word(0x8025_0000 + word, 0x8020_3008);
    kernel.put_word(0x8025_0000, 0x100);

    let fs = ProcFS::new();
    fs.register_task(&task);
    let content = read_pid_file(&fs, 702, "stack");

    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec!["0x80201010  schedule +16", "0x80203008  sys_read +8"]
    );
    fs.deregister_task(702);
    kernel.remove_task(702);
}

#[test]
fn test_stack_walk_stops_on_invalid_frame_pointer() {
    let kernel = kernel();
    let mut task = MockTask::new(703);
    task.ip = 0x8020_5004; // timer_tick +4
    task.fp = 0x1000; // 立即离开内核地址范围
    kernel.add_task(task.clone());

    let fs = ProcFS::new();
    fs.register_task(&task);
    let content = read_pid_file(&fs, 703, "stack");

    // 至多一帧（保存的指令指针本身）
    assert_eq!(content.lines().count(), 1);
    assert!(content.starts_with("0x80205004  timer_tick +4"));

    fs.deregister_task(703);
    kernel.remove_task(703);
}

#[test]
fn test_fds_skips_empty_slots() {
    let kernel = kernel();
    let mut task = MockTask::new(704);
    task.fds = vec![
        Some("/dev/tty".into()),
        None,
        Some("/home/data".into()),
    ];
    kernel.add_task(task.clone());

    let fs = ProcFS::new();
    fs.register_task(&task);
    let content = read_pid_file(&fs, 704, "fds");

    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec!["  0 /dev/tty", "  2 /home/data"]);

    fs.deregister_task(704);
    kernel.remove_task(704);
}

#[test]
fn test_read_at_offsets_slice_fresh_content() {
    kernel();
    let fs = ProcFS::new();
    let inode = fs.root_inode().lookup("kmalloc").unwrap();

    let full = read_all(inode.as_ref());
    let mut buf = [0u8; 8];
    let n = inode.read_at(14, &mut buf).unwrap();
    assert_eq!(&full.as_bytes()[14..14 + n], &buf[..n]);

    let n = inode.read_at(1_000_000, &mut buf).unwrap();
    assert_eq!(n, 0);
}

#[test]
fn test_vanished_task_read_is_not_found() {
    let kernel = kernel();
    let task = MockTask::new(705);
    kernel.add_task(task.clone());

    let fs = ProcFS::new();
    fs.register_task(&task);
    let inode = fs
        .root_inode()
        .lookup("705")
        .unwrap()
        .lookup("vm")
        .unwrap();

    // 进程表中的任务消失后，保留的 inode 句柄读取返回 NotFound
    kernel.remove_task(705);
    let mut buf = [0u8; 16];
    assert_eq!(inode.read_at(0, &mut buf), Err(vfs::FsError::NotFound));

    fs.deregister_task(705);
}
