pub const RESERVED_PRINTER_PREFIX: &str = "LoQQuei";

pub const RESERVED_PRINTER_NAMES: [&str; 2] = ["LoQQuei PDF Printer", "Impressora LoQQuei"];

pub const LOOPBACK_HOST: &str = "127.0.0.1";

pub const SPOOLER_SERVICE: &str = "spooler";

pub const POINT_AND_PRINT_KEY: &str =
    r"HKLM\SOFTWARE\Policies\Microsoft\Windows NT\Printers\PointAndPrint";

pub const UNINSTALL_KEY_ROOT: &str =
    r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall";

pub const RUNTIME_INSTALLER_URL: &str =
    "https://www.python.org/ftp/python/3.10.11/python-3.10.11-amd64.exe";

pub const RUNTIME_SILENT_ARGS: [&str; 4] =
    ["/quiet", "InstallAllUsers=1", "PrependPath=1", "Include_test=0"];

const RUNTIME_MINOR_VERSIONS: std::ops::RangeInclusive<u32> = 8..=12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostLocale {
    Portuguese,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCapabilities {
    pub everyone_principals: Vec<&'static str>,
    pub print_operator_groups: Vec<&'static str>,
}

impl PlatformCapabilities {
    pub fn detect() -> Self {
        Self::for_locale_tag(locale_tag().as_deref())
    }

    pub fn for_locale_tag(tag: Option<&str>) -> Self {
        match host_locale(tag) {
            HostLocale::Portuguese => Self {
                everyone_principals: vec![
                    "Todos",
                    "Everyone",
                    "Usuários Autenticados",
                    "Authenticated Users",
                ],
                print_operator_groups: vec!["Opers. de impressão", "Print Operators"],
            },
            HostLocale::Other => Self {
                everyone_principals: vec![
                    "Everyone",
                    "Todos",
                    "Authenticated Users",
                    "Usuários Autenticados",
                ],
                print_operator_groups: vec!["Print Operators", "Opers. de impressão"],
            },
        }
    }
}

fn locale_tag() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .find_map(|name| std::env::var(name).ok())
        .filter(|value| !value.trim().is_empty())
}

fn host_locale(tag: Option<&str>) -> HostLocale {
    match tag {
        Some(tag) if tag.to_ascii_lowercase().starts_with("pt") => HostLocale::Portuguese,
        _ => HostLocale::Other,
    }
}

pub fn runtime_registry_keys() -> Vec<String> {
    let mut keys = Vec::new();
    for scope in ["HKLM", "HKCU"] {
        for minor in RUNTIME_MINOR_VERSIONS {
            keys.push(format!(
                r"{scope}\SOFTWARE\Python\PythonCore\3.{minor}\InstallPath"
            ));
        }
    }
    keys
}
