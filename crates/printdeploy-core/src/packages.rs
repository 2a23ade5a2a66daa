#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: &'static str,
    pub minimum: &'static str,
    pub probe_module: &'static str,
}

impl PackageSpec {
    pub fn pip_requirement(&self) -> String {
        format!("{}>={}", self.name, self.minimum)
    }
}

// Fixed at build time; the application imports every one of these at startup.
const PACKAGE_SPECS: [PackageSpec; 10] = [
    PackageSpec {
        name: "wxPython",
        minimum: "4.2.0",
        probe_module: "wx",
    },
    PackageSpec {
        name: "pywin32",
        minimum: "300",
        probe_module: "win32print",
    },
    PackageSpec {
        name: "requests",
        minimum: "2.31.0",
        probe_module: "requests",
    },
    PackageSpec {
        name: "pypdf",
        minimum: "3.1.0",
        probe_module: "pypdf",
    },
    PackageSpec {
        name: "appdirs",
        minimum: "1.4.4",
        probe_module: "appdirs",
    },
    PackageSpec {
        name: "pyyaml",
        minimum: "6.0.1",
        probe_module: "yaml",
    },
    PackageSpec {
        name: "pillow",
        minimum: "10.0.1",
        probe_module: "PIL",
    },
    PackageSpec {
        name: "watchdog",
        minimum: "3.0.0",
        probe_module: "watchdog",
    },
    PackageSpec {
        name: "pyipp",
        minimum: "0.11.0",
        probe_module: "pyipp",
    },
    PackageSpec {
        name: "aiohttp",
        minimum: "3.8.0",
        probe_module: "aiohttp",
    },
];

pub fn package_specs() -> &'static [PackageSpec] {
    &PACKAGE_SPECS
}
