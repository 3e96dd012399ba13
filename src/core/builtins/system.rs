use crate::core::error::ShellError;
use crate::core::session::Session;
use crate::core::sysmon::{format_cpu, format_disks, format_memory, format_processes, format_top};

pub fn cpu(_args: &[String], session: &mut Session) -> Result<String, ShellError> {
    Ok(format_cpu(&session.probe().cpu()))
}

pub fn mem(_args: &[String], session: &mut Session) -> Result<String, ShellError> {
    Ok(format_memory(&session.probe().memory()))
}

pub fn ps(_args: &[String], session: &mut Session) -> Result<String, ShellError> {
    let probe = session.probe();
    let total = probe.memory().total;
    Ok(format_processes(probe.processes(), total))
}

pub fn top(_args: &[String], session: &mut Session) -> Result<String, ShellError> {
    let probe = session.probe();
    let cpu = probe.cpu();
    let memory = probe.memory();
    Ok(format_top(&cpu, &memory, probe.processes()))
}

pub fn df(_args: &[String], session: &mut Session) -> Result<String, ShellError> {
    Ok(format_disks(&session.probe().disks()))
}
