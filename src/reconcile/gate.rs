//! Platform versions and the [`VersionGate`] evaluator.
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A dotted numeric platform version (`major[.minor[.build]]`).
///
/// Missing components are zero, so `"22621"` is `22621.0.0` and
/// `"10.0"` is `10.0.0`.  Ordering is component-wise.
///
/// # Examples
///
/// ```
/// use devsetup_cli::reconcile::PlatformVersion;
///
/// let win11: PlatformVersion = "10.0.22621".parse().unwrap();
/// assert!(win11 > PlatformVersion::new(10, 0, 22000));
/// assert_eq!(win11.to_string(), "10.0.22621");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlatformVersion {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Build component (Windows build number, kernel patch level).
    pub build: u32,
}

impl PlatformVersion {
    /// Create a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            build,
        }
    }

    /// A Windows 10/11 version for the given build number (`10.0.<build>`).
    #[must_use]
    pub const fn windows_build(build: u32) -> Self {
        Self::new(10, 0, build)
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

impl FromStr for PlatformVersion {
    type Err = ConfigError;

    /// Parse a version, ignoring any non-numeric suffix on a component
    /// (`"6.8.0-45-generic"` parses as `6.8.0`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidVersion(s.to_string());
        let mut parts = s.trim().splitn(3, '.').map(leading_number);
        let major = parts.next().flatten().ok_or_else(invalid)?;
        let minor = parts.next().flatten().unwrap_or(0);
        let build = parts.next().flatten().unwrap_or(0);
        Ok(Self::new(major, minor, build))
    }
}

/// Parse the leading ASCII digits of `s`, if any.
fn leading_number(s: &str) -> Option<u32> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.get(..end).and_then(|digits| digits.parse().ok())
}

/// A minimum-version precondition for a setting.
///
/// # Examples
///
/// ```
/// use devsetup_cli::reconcile::{PlatformVersion, VersionGate};
///
/// let gate = VersionGate::new(
///     PlatformVersion::windows_build(22621),
///     PlatformVersion::windows_build(22000),
/// );
/// assert!(!gate.applicable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGate {
    /// Lowest platform version the setting supports.
    pub minimum: PlatformVersion,
    /// Version detected on this machine.
    pub actual: PlatformVersion,
}

impl VersionGate {
    /// Create a gate comparing `actual` against `minimum`.
    #[must_use]
    pub const fn new(minimum: PlatformVersion, actual: PlatformVersion) -> Self {
        Self { minimum, actual }
    }

    /// Whether the gated setting should be attempted (`actual >= minimum`).
    #[must_use]
    pub fn applicable(&self) -> bool {
        self.actual >= self.minimum
    }

    /// Reason reported when the gate is closed.
    #[must_use]
    pub fn reason(&self) -> String {
        format!(
            "requires version >= {} (found {})",
            self.minimum, self.actual
        )
    }
}
