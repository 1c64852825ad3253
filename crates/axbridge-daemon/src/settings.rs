//! Process-wide named settings with validated mutation.
//!
//! Components never get callbacks on change; they read the current value on
//! their next use. [`ConfigRegistry::revision`] lets a consumer notice that
//! something changed since it last looked.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::Duration;

use axbridge_common::{mutex_lock_or_recover, rwlock_read_or_recover, rwlock_write_or_recover};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

pub const WAIT_FOR_IDLE_TIMEOUT: &str = "waitForIdleTimeout";
pub const DONT_SUPPRESS_ACCESSIBILITY_SERVICES: &str = "dontSupressAccessibilityServices";
pub const USE_DEVICE_REAL_SIZE: &str = "useDeviceRealSize";
pub const AX_ROOT_RETRIEVAL_TIMEOUT: &str = "axRootRetrievalTimeout";
pub const XML_DUMP_MAX_SIZE: &str = "xmlDumpMaxSize";
pub const XML_DUMP_SKIP_UNBOUND: &str = "xmlDumpSkipUnbound";

const XML_DUMP_SKIP_UNBOUND_ALIAS: &str = "xmlDumpSkipUnboud";
const DONT_SUPPRESS_ACCESSIBILITY_SERVICES_ALIAS: &str = "dontSuppressAccessibilityServices";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),
    #[error("Setting '{name}' expects {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Invalid value for '{name}': {reason}")]
    OutOfRange { name: String, reason: String },
    #[error("Setting '{0}' is already registered")]
    DuplicateSetting(String),
}

/// A value type a setting can hold.
pub trait SettingType: Clone + Send + Sync + 'static {
    const TYPE_NAME: &'static str;

    fn from_json(value: &Value) -> Option<Self>;

    fn to_json(&self) -> Value;
}

impl SettingType for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

impl SettingType for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn from_json(value: &Value) -> Option<Self> {
        value.as_i64()
    }

    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

pub type Validator<T> = fn(&T) -> Result<(), String>;

pub struct Setting<T: SettingType> {
    name: &'static str,
    value: RwLock<T>,
    validator: Option<Validator<T>>,
}

impl<T: SettingType> Setting<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self) -> T {
        rwlock_read_or_recover(&self.value).clone()
    }

    fn parse(&self, raw: &Value) -> Result<T, SettingsError> {
        let value = T::from_json(raw).ok_or_else(|| SettingsError::TypeMismatch {
            name: self.name.to_string(),
            expected: T::TYPE_NAME,
            actual: json_kind(raw),
        })?;
        if let Some(validate) = self.validator {
            validate(&value).map_err(|reason| SettingsError::OutOfRange {
                name: self.name.to_string(),
                reason,
            })?;
        }
        Ok(value)
    }
}

type Commit<'a> = Box<dyn FnOnce() + 'a>;

trait ErasedSetting: Send + Sync {
    fn name(&self) -> &'static str;
    fn value_json(&self) -> Value;
    /// Validate `raw` and return the deferred store.
    fn stage<'a>(&'a self, raw: &Value) -> Result<Commit<'a>, SettingsError>;
    fn as_any(&self) -> &dyn Any;
}

impl<T: SettingType> ErasedSetting for Setting<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn value_json(&self) -> Value {
        self.get().to_json()
    }

    fn stage<'a>(&'a self, raw: &Value) -> Result<Commit<'a>, SettingsError> {
        let value = self.parse(raw)?;
        Ok(Box::new(move || {
            *rwlock_write_or_recover(&self.value) = value;
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn non_negative(value: &i64) -> Result<(), String> {
    if *value < 0 {
        return Err(format!("must be >= 0, got {value}"));
    }
    Ok(())
}

fn positive(value: &i64) -> Result<(), String> {
    if *value <= 0 {
        return Err(format!("must be > 0, got {value}"));
    }
    Ok(())
}

#[derive(Default)]
pub struct ConfigRegistry {
    settings: RwLock<HashMap<&'static str, Arc<dyn ErasedSetting>>>,
    aliases: RwLock<HashMap<&'static str, &'static str>>,
    write_lock: Mutex<()>,
    revision: AtomicU64,
}

impl ConfigRegistry {
    /// An empty registry with no settings registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the built-in settings at their defaults.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register_defaults();
        registry
    }

    /// The process-wide registry.
    pub fn global() -> Arc<ConfigRegistry> {
        static GLOBAL: OnceLock<Arc<ConfigRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ConfigRegistry::new())))
    }

    fn register_defaults(&self) {
        let builtins: [Result<(), SettingsError>; 6] = [
            self.register::<i64>(WAIT_FOR_IDLE_TIMEOUT, 3000, Some(non_negative))
                .map(drop),
            self.register::<bool>(DONT_SUPPRESS_ACCESSIBILITY_SERVICES, false, None)
                .map(drop),
            self.register::<bool>(USE_DEVICE_REAL_SIZE, false, None).map(drop),
            self.register::<i64>(AX_ROOT_RETRIEVAL_TIMEOUT, 3000, Some(non_negative))
                .map(drop),
            self.register::<i64>(XML_DUMP_MAX_SIZE, 1_000_000, Some(positive))
                .map(drop),
            self.register::<bool>(XML_DUMP_SKIP_UNBOUND, true, None).map(drop),
        ];
        for result in builtins {
            if let Err(e) = result {
                debug!(error = %e, "Skipping built-in setting");
            }
        }
        let mut aliases = rwlock_write_or_recover(&self.aliases);
        aliases.insert(XML_DUMP_SKIP_UNBOUND_ALIAS, XML_DUMP_SKIP_UNBOUND);
        aliases.insert(
            DONT_SUPPRESS_ACCESSIBILITY_SERVICES_ALIAS,
            DONT_SUPPRESS_ACCESSIBILITY_SERVICES,
        );
    }

    pub fn register<T: SettingType>(
        &self,
        name: &'static str,
        default: T,
        validator: Option<Validator<T>>,
    ) -> Result<Arc<Setting<T>>, SettingsError> {
        let mut settings = rwlock_write_or_recover(&self.settings);
        if settings.contains_key(name) {
            return Err(SettingsError::DuplicateSetting(name.to_string()));
        }
        let setting = Arc::new(Setting {
            name,
            value: RwLock::new(default),
            validator,
        });
        settings.insert(name, Arc::clone(&setting) as Arc<dyn ErasedSetting>);
        Ok(setting)
    }

    fn lookup(&self, name: &str) -> Result<Arc<dyn ErasedSetting>, SettingsError> {
        let canonical = rwlock_read_or_recover(&self.aliases)
            .get(name)
            .copied()
            .unwrap_or(name);
        rwlock_read_or_recover(&self.settings)
            .get(canonical)
            .cloned()
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_ok()
    }

    /// Current value of `name` as JSON.
    pub fn get(&self, name: &str) -> Result<Value, SettingsError> {
        Ok(self.lookup(name)?.value_json())
    }

    pub fn get_typed<T: SettingType>(&self, name: &str) -> Result<T, SettingsError> {
        let setting = self.lookup(name)?;
        setting
            .as_any()
            .downcast_ref::<Setting<T>>()
            .map(Setting::get)
            .ok_or_else(|| SettingsError::TypeMismatch {
                name: name.to_string(),
                expected: T::TYPE_NAME,
                actual: json_kind(&setting.value_json()),
            })
    }

    /// Type-check and store `raw`; on any failure the prior value is kept.
    pub fn set(&self, name: &str, raw: &Value) -> Result<(), SettingsError> {
        let setting = self.lookup(name)?;
        let _guard = mutex_lock_or_recover(&self.write_lock);
        let commit = setting.stage(raw)?;
        commit();
        self.revision.fetch_add(1, Ordering::SeqCst);
        info!(setting = setting.name(), value = %raw, "Setting updated");
        Ok(())
    }

    /// Apply a batch; nothing is stored unless every entry validates.
    pub fn set_many(&self, values: &Map<String, Value>) -> Result<(), SettingsError> {
        let resolved = values
            .iter()
            .map(|(name, raw)| self.lookup(name).map(|s| (s, raw)))
            .collect::<Result<Vec<_>, _>>()?;

        let _guard = mutex_lock_or_recover(&self.write_lock);
        let commits = resolved
            .iter()
            .map(|(setting, raw)| setting.stage(raw))
            .collect::<Result<Vec<_>, _>>()?;
        for commit in commits {
            commit();
        }
        if !resolved.is_empty() {
            self.revision.fetch_add(1, Ordering::SeqCst);
            info!(count = resolved.len(), "Settings updated");
        }
        Ok(())
    }

    /// Every registered setting keyed by its canonical name.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        rwlock_read_or_recover(&self.settings)
            .values()
            .map(|s| (s.name().to_string(), s.value_json()))
            .collect()
    }

    /// Bumped on every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    fn millis(&self, name: &str, fallback: u64) -> Duration {
        let ms = self
            .get_typed::<i64>(name)
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(fallback);
        Duration::from_millis(ms)
    }

    pub fn wait_for_idle_timeout(&self) -> Duration {
        self.millis(WAIT_FOR_IDLE_TIMEOUT, 3000)
    }

    pub fn ax_root_retrieval_timeout(&self) -> Duration {
        self.millis(AX_ROOT_RETRIEVAL_TIMEOUT, 3000)
    }

    pub fn dont_suppress_accessibility_services(&self) -> bool {
        self.get_typed(DONT_SUPPRESS_ACCESSIBILITY_SERVICES)
            .unwrap_or(false)
    }

    pub fn use_device_real_size(&self) -> bool {
        self.get_typed(USE_DEVICE_REAL_SIZE).unwrap_or(false)
    }

    pub fn xml_dump_max_size(&self) -> usize {
        self.get_typed::<i64>(XML_DUMP_MAX_SIZE)
            .ok()
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(1_000_000)
    }

    pub fn xml_dump_skip_unbound(&self) -> bool {
        self.get_typed(XML_DUMP_SKIP_UNBOUND).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let registry = ConfigRegistry::new();
        assert_eq!(registry.wait_for_idle_timeout(), Duration::from_millis(3000));
        assert_eq!(
            registry.ax_root_retrieval_timeout(),
            Duration::from_millis(3000)
        );
        assert!(!registry.dont_suppress_accessibility_services());
        assert!(!registry.use_device_real_size());
        assert_eq!(registry.xml_dump_max_size(), 1_000_000);
        assert!(registry.xml_dump_skip_unbound());
    }

    #[test]
    fn test_set_then_get() {
        let registry = ConfigRegistry::new();
        registry.set(USE_DEVICE_REAL_SIZE, &json!(true)).unwrap();
        assert_eq!(registry.get(USE_DEVICE_REAL_SIZE).unwrap(), json!(true));
        assert!(registry.use_device_real_size());
    }

    #[test]
    fn test_type_mismatch_keeps_prior_value() {
        let registry = ConfigRegistry::new();
        let revision = registry.revision();

        let err = registry
            .set(WAIT_FOR_IDLE_TIMEOUT, &json!("100"))
            .unwrap_err();
        assert_eq!(
            err,
            SettingsError::TypeMismatch {
                name: WAIT_FOR_IDLE_TIMEOUT.to_string(),
                expected: "integer",
                actual: "string",
            }
        );
        assert!(registry.set(WAIT_FOR_IDLE_TIMEOUT, &json!(1.5)).is_err());
        assert!(registry.set(USE_DEVICE_REAL_SIZE, &json!(1)).is_err());

        assert_eq!(registry.get(WAIT_FOR_IDLE_TIMEOUT).unwrap(), json!(3000));
        assert_eq!(registry.revision(), revision);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let registry = ConfigRegistry::new();
        assert!(matches!(
            registry.set(XML_DUMP_MAX_SIZE, &json!(0)),
            Err(SettingsError::OutOfRange { .. })
        ));
        assert!(matches!(
            registry.set(WAIT_FOR_IDLE_TIMEOUT, &json!(-1)),
            Err(SettingsError::OutOfRange { .. })
        ));
        assert!(registry.set(WAIT_FOR_IDLE_TIMEOUT, &json!(0)).is_ok());
    }

    #[test]
    fn test_unknown_setting() {
        let registry = ConfigRegistry::new();
        assert_eq!(
            registry.set("nope", &json!(1)),
            Err(SettingsError::UnknownSetting("nope".to_string()))
        );
    }

    #[test]
    fn test_misspelled_alias_is_accepted() {
        let registry = ConfigRegistry::new();
        registry.set("xmlDumpSkipUnboud", &json!(false)).unwrap();
        assert!(!registry.xml_dump_skip_unbound());
        assert_eq!(registry.get("xmlDumpSkipUnboud").unwrap(), json!(false));
        assert!(!registry.snapshot().contains_key("xmlDumpSkipUnboud"));
    }

    #[test]
    fn test_set_many_is_all_or_nothing() {
        let registry = ConfigRegistry::new();
        let batch = json!({
            "useDeviceRealSize": true,
            "waitForIdleTimeout": "fast",
        });
        assert!(registry.set_many(batch.as_object().unwrap()).is_err());
        assert!(!registry.use_device_real_size());

        let batch = json!({
            "useDeviceRealSize": true,
            "waitForIdleTimeout": 10,
        });
        registry.set_many(batch.as_object().unwrap()).unwrap();
        assert!(registry.use_device_real_size());
        assert_eq!(registry.wait_for_idle_timeout(), Duration::from_millis(10));
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = ConfigRegistry::new();
        assert!(matches!(
            registry.register::<bool>(USE_DEVICE_REAL_SIZE, true, None),
            Err(SettingsError::DuplicateSetting(_))
        ));
    }

    #[test]
    fn test_get_typed_wrong_type() {
        let registry = ConfigRegistry::new();
        assert!(registry.get_typed::<bool>(WAIT_FOR_IDLE_TIMEOUT).is_err());
    }

    #[test]
    fn test_corrected_spelling_reaches_same_setting() {
        let registry = ConfigRegistry::new();
        registry
            .set("dontSuppressAccessibilityServices", &json!(true))
            .unwrap();
        assert!(registry.dont_suppress_accessibility_services());
        assert_eq!(
            registry.get(DONT_SUPPRESS_ACCESSIBILITY_SERVICES).unwrap(),
            json!(true)
        );
        assert!(!registry
            .snapshot()
            .contains_key("dontSuppressAccessibilityServices"));
    }

    #[test]
    fn test_global_registry_is_shared() {
        assert!(Arc::ptr_eq(&ConfigRegistry::global(), &ConfigRegistry::global()));
    }

    #[test]
    fn test_snapshot_lists_all_builtins() {
        let snapshot = ConfigRegistry::new().snapshot();
        for name in [
            WAIT_FOR_IDLE_TIMEOUT,
            DONT_SUPPRESS_ACCESSIBILITY_SERVICES,
            USE_DEVICE_REAL_SIZE,
            AX_ROOT_RETRIEVAL_TIMEOUT,
            XML_DUMP_MAX_SIZE,
            XML_DUMP_SKIP_UNBOUND,
        ] {
            assert!(snapshot.contains_key(name), "{name} missing");
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn set_then_get_round_trips(timeout in 0i64..1_000_000, flag in any::<bool>()) {
                let registry = ConfigRegistry::new();
                registry.set(WAIT_FOR_IDLE_TIMEOUT, &json!(timeout)).unwrap();
                registry.set(USE_DEVICE_REAL_SIZE, &json!(flag)).unwrap();
                prop_assert_eq!(registry.get(WAIT_FOR_IDLE_TIMEOUT).unwrap(), json!(timeout));
                prop_assert_eq!(registry.get(USE_DEVICE_REAL_SIZE).unwrap(), json!(flag));
            }

            #[test]
            fn wrong_type_never_changes_value(text in "[a-z0-9]{0,8}") {
                let registry = ConfigRegistry::new();
                let before = registry.get(XML_DUMP_MAX_SIZE).unwrap();
                let result = registry.set(XML_DUMP_MAX_SIZE, &json!(text));
                let is_type_mismatch = matches!(result, Err(SettingsError::TypeMismatch { .. }));
                prop_assert!(is_type_mismatch);
                prop_assert_eq!(registry.get(XML_DUMP_MAX_SIZE).unwrap(), before);
            }
        }
    }
}
