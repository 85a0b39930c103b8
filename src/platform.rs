//! Operating system and version detection.
use std::fmt;

use crate::error::PlatformError;
use crate::reconcile::PlatformVersion;
use crate::resources::registry::{RegistryValue, SettingsStore};

/// Registry key holding the Windows version numbers.
const WINDOWS_VERSION_KEY: &str = r"HKLM\SOFTWARE\Microsoft\Windows NT\CurrentVersion";

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux (including WSL).
    Linux,
    /// Windows 10 or later.
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// OS version (Windows `10.0.<build>`, Linux kernel release).
    pub version: PlatformVersion,
}

impl Platform {
    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(os: Os, version: PlatformVersion) -> Self {
        Self { os, version }
    }

    /// Detect the current platform.
    ///
    /// Windows versions are read from the registry through `store`; Linux
    /// versions come from the running kernel release.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::DetectionFailed`] if the version cannot be
    /// determined.
    pub fn detect(store: &dyn SettingsStore) -> Result<Self, PlatformError> {
        let os = if cfg!(target_os = "windows") {
            Os::Windows
        } else {
            Os::Linux
        };
        let version = match os {
            Os::Windows => windows_version(store)?,
            Os::Linux => kernel_version()?,
        };
        Ok(Self { os, version })
    }

    /// Return `true` on Linux.
    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.os == Os::Linux
    }

    /// Return `true` on Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.os, self.version)
    }
}

/// Read `major.minor.build` from the Windows `CurrentVersion` key.
///
/// `CurrentMajorVersionNumber` and `CurrentMinorVersionNumber` are DWORDs
/// (absent before Windows 10, where `10.0` is assumed); `CurrentBuildNumber`
/// is a string.
///
/// # Errors
///
/// Returns [`PlatformError::DetectionFailed`] if the build number is missing
/// or not numeric.
pub fn windows_version(store: &dyn SettingsStore) -> Result<PlatformVersion, PlatformError> {
    let read = |name: &str| {
        store
            .read_value(WINDOWS_VERSION_KEY, name)
            .map_err(|e| PlatformError::DetectionFailed(format!("{name}: {e:#}")))
    };
    let dword = |value: Option<RegistryValue>, default: u32| match value {
        Some(RegistryValue::DWord(n)) => n,
        Some(RegistryValue::String(s) | RegistryValue::ExpandString(s)) => {
            s.trim().parse().unwrap_or(default)
        }
        None => default,
    };

    let major = dword(read("CurrentMajorVersionNumber")?, 10);
    let minor = dword(read("CurrentMinorVersionNumber")?, 0);
    let build = match read("CurrentBuildNumber")? {
        Some(RegistryValue::String(s) | RegistryValue::ExpandString(s)) => s.trim().parse().ok(),
        Some(RegistryValue::DWord(n)) => Some(n),
        None => None,
    }
    .ok_or_else(|| PlatformError::DetectionFailed("CurrentBuildNumber missing".to_string()))?;

    Ok(PlatformVersion::new(major, minor, build))
}

fn kernel_version() -> Result<PlatformVersion, PlatformError> {
    let release = std::fs::read_to_string("/proc/sys/kernel/osrelease")
        .map_err(|e| PlatformError::DetectionFailed(format!("kernel release: {e}")))?;
    release
        .parse()
        .map_err(|e: crate::error::ConfigError| PlatformError::DetectionFailed(e.to_string()))
}
