use std::thread;

use sysinfo::{Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};

use crate::core::format::{human_size, percent};

#[derive(Debug, Clone, PartialEq)]
pub struct CpuSnapshot {
    pub overall: f32,
    pub per_core: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemorySnapshot {
    pub total: u64,
    pub used: u64,
    pub swap_total: u64,
    pub swap_used: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiskInfo {
    pub device: String,
    pub mount_point: String,
    pub file_system: String,
    pub total: u64,
    pub available: u64,
}

/// Source of machine statistics for `cpu`, `mem`, `ps`, `top` and `df`.
pub trait SystemProbe {
    fn cpu(&mut self) -> CpuSnapshot;
    fn memory(&mut self) -> MemorySnapshot;
    fn processes(&mut self) -> Vec<ProcessInfo>;
    fn disks(&mut self) -> Vec<DiskInfo>;
}

pub struct SysinfoProbe {
    system: System,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe for SysinfoProbe {
    fn cpu(&mut self) -> CpuSnapshot {
        // Usage is a delta between two refreshes
        self.system.refresh_cpu();
        thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
        self.system.refresh_cpu();

        CpuSnapshot {
            overall: self.system.global_cpu_info().cpu_usage(),
            per_core: self.system.cpus().iter().map(|c| c.cpu_usage()).collect(),
        }
    }

    fn memory(&mut self) -> MemorySnapshot {
        self.system.refresh_memory();
        MemorySnapshot {
            total: self.system.total_memory(),
            used: self.system.used_memory(),
            swap_total: self.system.total_swap(),
            swap_used: self.system.used_swap(),
        }
    }

    fn processes(&mut self) -> Vec<ProcessInfo> {
        self.system.refresh_processes();
        thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
        self.system.refresh_processes();

        self.system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessInfo {
                pid: pid.as_u32(),
                name: process.name().to_string(),
                cpu_percent: process.cpu_usage(),
                memory: process.memory(),
            })
            .collect()
    }

    fn disks(&mut self) -> Vec<DiskInfo> {
        Disks::new_with_refreshed_list()
            .list()
            .iter()
            .map(|disk| DiskInfo {
                device: disk.name().to_string_lossy().into_owned(),
                mount_point: disk.mount_point().display().to_string(),
                file_system: disk.file_system().to_string_lossy().into_owned(),
                total: disk.total_space(),
                available: disk.available_space(),
            })
            .collect()
    }
}

pub fn format_cpu(cpu: &CpuSnapshot) -> String {
    format!("CPU Usage: {:.1}%", cpu.overall)
}

pub fn format_memory(mem: &MemorySnapshot) -> String {
    format!(
        "Memory Usage: {:.1}% ({}MB/{}MB)",
        percent(mem.used, mem.total),
        mem.used / (1024 * 1024),
        mem.total / (1024 * 1024)
    )
}

fn process_line(p: &ProcessInfo, total_memory: u64) -> String {
    format!(
        "{:>7} {:>5.1}% {:>5.2}% {}",
        p.pid,
        p.cpu_percent,
        percent(p.memory, total_memory),
        p.name
    )
}

pub fn format_processes(mut processes: Vec<ProcessInfo>, total_memory: u64) -> String {
    processes.sort_by_key(|p| p.pid);
    let mut lines = vec![format!("{:>7} {:>6} {:>6} {}", "PID", "CPU", "MEM", "NAME")];
    lines.extend(processes.iter().map(|p| process_line(p, total_memory)));
    lines.join("\n")
}

pub fn format_top(cpu: &CpuSnapshot, mem: &MemorySnapshot, mut processes: Vec<ProcessInfo>) -> String {
    let per_core = cpu
        .per_core
        .iter()
        .map(|c| format!("{:.1}%", c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        format!("CPU: {:.1}% overall", cpu.overall),
        format!("Per-CPU: {}", per_core),
        format!(
            "Memory: {:.1}% ({} / {})",
            percent(mem.used, mem.total),
            human_size(mem.used),
            human_size(mem.total)
        ),
        format!(
            "Swap  : {:.1}% ({} / {})",
            percent(mem.swap_used, mem.swap_total),
            human_size(mem.swap_used),
            human_size(mem.swap_total)
        ),
        String::new(),
        "Top processes by CPU:".to_string(),
    ];

    processes.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    lines.extend(processes.iter().take(10).map(|p| process_line(p, mem.total)));
    lines.join("\n")
}

pub fn format_disks(disks: &[DiskInfo]) -> String {
    disks
        .iter()
        .map(|d| {
            let used = d.total.saturating_sub(d.available);
            format!(
                "{} on {} ({}) - {:.1}% used ({}/{})",
                d.device,
                d.mount_point,
                d.file_system,
                percent(used, d.total),
                human_size(used),
                human_size(d.total)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Fixed numbers for handler tests.
    pub struct FakeProbe;

    impl SystemProbe for FakeProbe {
        fn cpu(&mut self) -> CpuSnapshot {
            CpuSnapshot {
                overall: 12.5,
                per_core: vec![10.0, 15.0],
            }
        }

        fn memory(&mut self) -> MemorySnapshot {
            MemorySnapshot {
                total: 8 * 1024 * 1024 * 1024,
                used: 2 * 1024 * 1024 * 1024,
                swap_total: 0,
                swap_used: 0,
            }
        }

        fn processes(&mut self) -> Vec<ProcessInfo> {
            vec![
                ProcessInfo { pid: 42, name: "editor".into(), cpu_percent: 1.0, memory: 1024 },
                ProcessInfo { pid: 7, name: "init".into(), cpu_percent: 30.0, memory: 2048 },
            ]
        }

        fn disks(&mut self) -> Vec<DiskInfo> {
            vec![DiskInfo {
                device: "/dev/sda1".into(),
                mount_point: "/".into(),
                file_system: "ext4".into(),
                total: 1000,
                available: 250,
            }]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeProbe;
    use super::*;

    #[test]
    fn memory_line() {
        let mem = FakeProbe.memory();
        assert_eq!(format_memory(&mem), "Memory Usage: 25.0% (2048MB/8192MB)");
    }

    #[test]
    fn processes_sorted_by_pid() {
        let out = format_processes(FakeProbe.processes(), 8192);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].trim_start().starts_with("7 "));
        assert!(lines[2].ends_with("editor"));
    }

    #[test]
    fn top_orders_by_cpu() {
        let mut probe = FakeProbe;
        let out = format_top(&probe.cpu(), &probe.memory(), probe.processes());
        assert!(out.starts_with("CPU: 12.5% overall\nPer-CPU: 10.0%, 15.0%"));
        let after_header = out.split("Top processes by CPU:\n").nth(1).unwrap();
        assert!(after_header.lines().next().unwrap().ends_with("init"));
    }

    #[test]
    fn disk_usage() {
        let out = format_disks(&FakeProbe.disks());
        assert_eq!(out, "/dev/sda1 on / (ext4) - 75.0% used (750.0B/1000.0B)");
    }
}
