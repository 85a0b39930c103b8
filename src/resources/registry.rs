//! Windows registry settings behind the [`SettingsStore`] seam.
//!
//! [`RegistrySetting`] adapts one registry value to the [`Setting`]
//! interface.  The store itself is injectable: production uses
//! [`system_store`] (native `winreg` access on Windows, an unsupported stub
//! elsewhere) and tests use an in-memory store.
use std::fmt;

use anyhow::{Context as _, Result, bail};

use super::Setting;
use crate::error::ReconcileError;
use crate::reconcile::{ValueKind, parse_bool, parse_integer};

/// User-scope environment variables live under this key.
pub const USER_ENVIRONMENT_KEY: &str = r"HKCU\Environment";

/// A typed registry value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryValue {
    /// `REG_SZ`.
    String(String),
    /// `REG_EXPAND_SZ`, held unexpanded.
    ExpandString(String),
    /// `REG_DWORD`.
    DWord(u32),
}

impl fmt::Display for RegistryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::ExpandString(s) => f.write_str(s),
            Self::DWord(n) => write!(f, "{n}"),
        }
    }
}

impl RegistryValue {
    /// Convert a textual target into the registry type implied by `kind`.
    ///
    /// Strings become `REG_SZ`; integer flags and booleans become
    /// `REG_DWORD`.
    ///
    /// # Errors
    ///
    /// Returns an error if an integer flag is not a number that fits in a
    /// DWORD, or a boolean cannot be normalized.
    pub fn for_kind(kind: ValueKind, value: &str) -> Result<Self> {
        match kind {
            ValueKind::String => Ok(Self::String(value.to_string())),
            ValueKind::IntegerFlag => {
                let n = parse_integer(value.trim())
                    .with_context(|| format!("'{value}' is not an integer"))?;
                let n = u32::try_from(n)
                    .with_context(|| format!("'{value}' does not fit in a DWORD"))?;
                Ok(Self::DWord(n))
            }
            ValueKind::Boolean => match parse_bool(value.trim()) {
                Some(b) => Ok(Self::DWord(u32::from(b))),
                None => bail!("'{value}' is not a boolean"),
            },
        }
    }
}

/// Abstraction over a hierarchical key/value settings store.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore {
    /// Read `name` under `path`; `Ok(None)` when the key or value is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn read_value(&self, path: &str, name: &str) -> Result<Option<RegistryValue>>;

    /// Write `value` to `name` under `path`, creating the key if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be created or the value written.
    fn write_value(&self, path: &str, name: &str, value: &RegistryValue) -> Result<()>;
}

/// Registry root hives accepted in key paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hive {
    /// `HKEY_CURRENT_USER` (`HKCU`).
    CurrentUser,
    /// `HKEY_LOCAL_MACHINE` (`HKLM`).
    LocalMachine,
}

/// Split `HKCU\Sub\Key` (or `HKCU:\Sub\Key`, `HKEY_CURRENT_USER\Sub\Key`)
/// into its hive and subkey.
///
/// # Errors
///
/// Returns an error if the hive prefix is not recognised.
pub fn split_hive(path: &str) -> Result<(Hive, &str)> {
    let (head, rest) = path.split_once('\\').unwrap_or((path, ""));
    let hive = match head.trim_end_matches(':').to_ascii_uppercase().as_str() {
        "HKCU" | "HKEY_CURRENT_USER" => Hive::CurrentUser,
        "HKLM" | "HKEY_LOCAL_MACHINE" => Hive::LocalMachine,
        other => bail!("unsupported registry hive '{other}' in {path}"),
    };
    Ok((hive, rest))
}

/// One registry value reconciled through a [`SettingsStore`].
pub struct RegistrySetting<'a> {
    /// Key path (e.g., `HKCU\Control Panel\International`).
    pub path: String,
    /// Value name.
    pub name: String,
    /// Type used when writing.
    pub kind: ValueKind,
    store: &'a dyn SettingsStore,
}

impl fmt::Debug for RegistrySetting<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrySetting")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<'a> RegistrySetting<'a> {
    /// Create a registry setting.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        kind: ValueKind,
        store: &'a dyn SettingsStore,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind,
            store,
        }
    }

    fn is_expand_string(&self) -> bool {
        matches!(
            self.store.read_value(&self.path, &self.name),
            Ok(Some(RegistryValue::ExpandString(_)))
        )
    }

    /// A user-scope environment variable (`HKCU\Environment`).
    #[must_use]
    pub fn environment(name: impl Into<String>, store: &'a dyn SettingsStore) -> Self {
        Self::new(USER_ENVIRONMENT_KEY, name, ValueKind::String, store)
    }
}

impl Setting for RegistrySetting<'_> {
    fn description(&self) -> String {
        format!("{}\\{}", self.path, self.name)
    }

    fn read(&self) -> Result<String, ReconcileError> {
        match self.store.read_value(&self.path, &self.name) {
            Ok(Some(value)) => Ok(value.to_string()),
            Ok(None) => Err(self.not_found()),
            Err(e) => Err(ReconcileError::read_failed(
                self.description(),
                format!("{e:#}"),
            )),
        }
    }

    /// An existing `REG_EXPAND_SZ` value stays `REG_EXPAND_SZ` (`Path`, for
    /// example), so `%VAR%` references keep expanding.
    fn write(&self, value: &str) -> Result<()> {
        let typed = match RegistryValue::for_kind(self.kind, value)? {
            RegistryValue::String(s) if self.is_expand_string() => RegistryValue::ExpandString(s),
            typed => typed,
        };
        self.store
            .write_value(&self.path, &self.name, &typed)
            .with_context(|| format!("set registry: {}", self.description()))
    }
}

/// Store used on platforms without a registry; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedStore;

impl SettingsStore for UnsupportedStore {
    fn read_value(&self, _: &str, _: &str) -> Result<Option<RegistryValue>> {
        Err(unsupported().into())
    }

    fn write_value(&self, _: &str, _: &str, _: &RegistryValue) -> Result<()> {
        Err(unsupported().into())
    }
}

fn unsupported() -> crate::error::PlatformError {
    crate::error::PlatformError::Unsupported {
        operation: "registry access".to_string(),
        platform: std::env::consts::OS.to_string(),
    }
}

/// Native registry access via `winreg`.
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct WinregStore;

#[cfg(windows)]
impl WinregStore {
    fn root(hive: Hive) -> winreg::RegKey {
        use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};
        match hive {
            Hive::CurrentUser => winreg::RegKey::predef(HKEY_CURRENT_USER),
            Hive::LocalMachine => winreg::RegKey::predef(HKEY_LOCAL_MACHINE),
        }
    }
}

#[cfg(windows)]
impl SettingsStore for WinregStore {
    fn read_value(&self, path: &str, name: &str) -> Result<Option<RegistryValue>> {
        use std::io::ErrorKind;
        use winreg::enums::RegType;
        use winreg::types::FromRegValue as _;

        let (hive, subkey) = split_hive(path)?;
        let key = match Self::root(hive).open_subkey(subkey) {
            Ok(key) => key,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("open registry key {path}")),
        };

        let raw = match key.get_raw_value(name) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read registry value {path}\\{name}"));
            }
        };
        let value = match raw.vtype {
            RegType::REG_DWORD => u32::from_reg_value(&raw).map(RegistryValue::DWord),
            RegType::REG_EXPAND_SZ => {
                String::from_reg_value(&raw).map(RegistryValue::ExpandString)
            }
            _ => String::from_reg_value(&raw).map(RegistryValue::String),
        };
        value
            .map(Some)
            .with_context(|| format!("decode registry value {path}\\{name}"))
    }

    fn write_value(&self, path: &str, name: &str, value: &RegistryValue) -> Result<()> {
        let (hive, subkey) = split_hive(path)?;
        let (key, _) = Self::root(hive)
            .create_subkey(subkey)
            .with_context(|| format!("create registry key {path}"))?;
        match value {
            RegistryValue::String(s) => key.set_value(name, s),
            RegistryValue::ExpandString(s) => {
                let bytes: Vec<u8> = s
                    .encode_utf16()
                    .chain(Some(0))
                    .flat_map(u16::to_le_bytes)
                    .collect();
                key.set_raw_value(
                    name,
                    &winreg::RegValue {
                        bytes: bytes.into(),
                        vtype: winreg::enums::RegType::REG_EXPAND_SZ,
                    },
                )
            }
            RegistryValue::DWord(n) => key.set_value(name, n),
        }
        .with_context(|| format!("write registry value {path}\\{name}"))
    }
}

/// The settings store for the current platform.
#[must_use]
pub fn system_store() -> Box<dyn SettingsStore + Send + Sync> {
    #[cfg(windows)]
    {
        Box::new(WinregStore)
    }
    #[cfg(not(windows))]
    {
        Box::new(UnsupportedStore)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MemoryStore;

    const INTL: &str = r"HKCU\Control Panel\International";

    #[test]
    fn description_joins_path_and_name() {
        let store = MemoryStore::new();
        let setting = RegistrySetting::new(INTL, "sShortDate", ValueKind::String, &store);
        assert_eq!(
            setting.description(),
            r"HKCU\Control Panel\International\sShortDate"
        );
    }

    #[test]
    fn read_missing_value_is_not_found() {
        let store = MemoryStore::new();
        let setting = RegistrySetting::new(INTL, "sShortDate", ValueKind::String, &store);
        assert!(setting.read().unwrap_err().is_not_found());
    }

    #[test]
    fn read_dword_as_decimal_string() {
        let store = MemoryStore::new().with(INTL, "iFirstDayOfWeek", RegistryValue::DWord(0));
        let setting =
            RegistrySetting::new(INTL, "iFirstDayOfWeek", ValueKind::IntegerFlag, &store);
        assert_eq!(setting.read().unwrap(), "0");
    }

    #[test]
    fn write_boolean_stores_dword() {
        let store = MemoryStore::new();
        let setting = RegistrySetting::new(INTL, "Flag", ValueKind::Boolean, &store);
        setting.write("true").unwrap();
        assert_eq!(store.get(INTL, "Flag"), Some(RegistryValue::DWord(1)));
    }

    #[test]
    fn write_hex_integer_stores_dword() {
        let store = MemoryStore::new();
        let setting = RegistrySetting::new(INTL, "FontSize", ValueKind::IntegerFlag, &store);
        setting.write("0x0E").unwrap();
        assert_eq!(store.get(INTL, "FontSize"), Some(RegistryValue::DWord(14)));
    }

    #[test]
    fn write_rejects_non_numeric_integer_flag() {
        let store = MemoryStore::new();
        let setting = RegistrySetting::new(INTL, "FontSize", ValueKind::IntegerFlag, &store);
        assert!(setting.write("large").is_err());
        assert_eq!(store.get(INTL, "FontSize"), None);
    }

    #[test]
    fn write_rejects_negative_dword() {
        assert!(RegistryValue::for_kind(ValueKind::IntegerFlag, "-1").is_err());
    }

    #[test]
    fn environment_targets_user_environment_key() {
        let store = MemoryStore::new();
        let setting = RegistrySetting::environment("EDITOR", &store);
        setting.write("code --wait").unwrap();
        assert_eq!(
            store.get(USER_ENVIRONMENT_KEY, "EDITOR"),
            Some(RegistryValue::String("code --wait".to_string()))
        );
    }

    #[test]
    fn environment_keeps_expand_string_type() {
        let store = MemoryStore::new().with(
            USER_ENVIRONMENT_KEY,
            "Path",
            RegistryValue::ExpandString(r"%USERPROFILE%\bin".to_string()),
        );
        let setting = RegistrySetting::environment("Path", &store);

        assert_eq!(setting.read().unwrap(), r"%USERPROFILE%\bin");
        setting.write(r"%USERPROFILE%\bin;%USERPROFILE%\.cargo\bin").unwrap();

        assert_eq!(
            store.get(USER_ENVIRONMENT_KEY, "Path"),
            Some(RegistryValue::ExpandString(
                r"%USERPROFILE%\bin;%USERPROFILE%\.cargo\bin".to_string()
            ))
        );
    }

    #[test]
    fn new_environment_value_is_plain_string() {
        let store = MemoryStore::new();
        RegistrySetting::environment("GOPATH", &store)
            .write(r"%USERPROFILE%\go")
            .unwrap();
        assert_eq!(
            store.get(USER_ENVIRONMENT_KEY, "GOPATH"),
            Some(RegistryValue::String(r"%USERPROFILE%\go".to_string()))
        );
    }

    #[test]
    fn store_error_is_read_failed() {
        let setting = RegistrySetting::new(INTL, "sShortDate", ValueKind::String, &UnsupportedStore);
        let err = setting.read().unwrap_err();
        assert!(matches!(err, ReconcileError::ReadFailed { .. }));
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn read_uses_store_once_per_call() {
        let mut store = MockSettingsStore::new();
        store
            .expect_read_value()
            .with(
                mockall::predicate::eq(INTL),
                mockall::predicate::eq("sShortTime"),
            )
            .times(1)
            .returning(|_, _| Ok(Some(RegistryValue::String("HH:mm".to_string()))));
        store.expect_write_value().never();

        let setting = RegistrySetting::new(INTL, "sShortTime", ValueKind::String, &store);
        assert_eq!(setting.read().unwrap(), "HH:mm");
    }

    #[test]
    fn split_hive_accepts_short_long_and_powershell_forms() {
        assert_eq!(
            split_hive(r"HKCU\Environment").unwrap(),
            (Hive::CurrentUser, "Environment")
        );
        assert_eq!(
            split_hive(r"HKCU:\Console").unwrap(),
            (Hive::CurrentUser, "Console")
        );
        assert_eq!(
            split_hive(r"HKEY_LOCAL_MACHINE\SOFTWARE\Policies").unwrap(),
            (Hive::LocalMachine, r"SOFTWARE\Policies")
        );
    }

    #[test]
    fn split_hive_rejects_unknown_root() {
        assert!(split_hive(r"HKCR\Directory").is_err());
    }
}
