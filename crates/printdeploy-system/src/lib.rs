mod acl;
mod exec;
mod policy;
mod printers;
mod process;
mod service;

pub use acl::{grant_full_access, join_print_operators_group, PrincipalOutcome};
pub use exec::{run_command, run_command_capture};
pub use policy::{
    point_and_print_values, set_point_and_print_policy, uninstall_metadata_key,
    uninstall_metadata_values, write_uninstall_metadata, RegistryValue,
};
pub use printers::{
    find_reserved_ports, find_reserved_printers, reclaim_print_resources, ReclaimReport,
    PRINTER_SETTLE,
};
pub use process::{is_running, stop_process, KILL_SETTLE};
pub use service::{restart_spooler, SpoolerRestart, SERVICE_SETTLE};

#[cfg(test)]
mod tests;
