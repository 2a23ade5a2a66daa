mod context;
mod manifest;
mod packages;
mod platform;
mod step;

pub use context::InstallContext;
pub use manifest::DeployManifest;
pub use packages::{package_specs, PackageSpec};
pub use platform::{
    runtime_registry_keys, PlatformCapabilities, LOOPBACK_HOST, POINT_AND_PRINT_KEY,
    RESERVED_PRINTER_NAMES, RESERVED_PRINTER_PREFIX, RUNTIME_INSTALLER_URL, RUNTIME_SILENT_ARGS,
    SPOOLER_SERVICE, UNINSTALL_KEY_ROOT,
};
pub use step::{RunLog, RunOutcome, StepClass, StepRecord, StepStatus};
