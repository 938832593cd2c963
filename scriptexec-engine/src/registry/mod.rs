//! Application registry stored inside a registry instance.
//!
//! A registry is an ordinary instance whose application namespace holds, per
//! application name, the registering provider and a list of versions. Each
//! version records an index (init) address and an ordered selector → target
//! table. A version is locked once an instance has been created against it;
//! re-registering a locked version publishes the next version instead.

mod handlers;

use std::collections::BTreeSet;
use std::fmt;

use scriptexec_primitives::{Address, Selector, H256};
use serde::Serialize;
use tracing::info;

use crate::abi::{CalldataBuilder, CalldataReader};
use crate::context::StorageView;
use crate::error::{EngineError, EngineResult};
use crate::write_set::WriteSet;

pub use handlers::{RegistryIndex, RegistryProvider};

/// Name of a registered application: 1 to 32 bytes of UTF-8 without NUL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AppName(String);

impl AppName {
    pub const MAX_LEN: usize = 32;

    pub fn new(name: &str) -> EngineResult<Self> {
        if name.is_empty() || name.len() > Self::MAX_LEN || name.contains('\0') {
            return Err(EngineError::invalid_registration(format!(
                "application name '{}' must be 1 to {} bytes without NUL",
                name.escape_default(),
                Self::MAX_LEN
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// Decodes a left-aligned, zero-padded `bytes32` name.
    pub fn from_word(word: &H256) -> EngineResult<Self> {
        let bytes = word.as_bytes();
        let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        let name = std::str::from_utf8(&bytes[..end])
            .map_err(|_| EngineError::invalid_registration("application name is not UTF-8"))?;
        Self::new(name)
    }

    pub fn to_word(&self) -> H256 {
        let mut out = [0u8; 32];
        out[..self.0.len()].copy_from_slice(self.0.as_bytes());
        H256::new(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Arguments of a `registerApp` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: AppName,
    pub index: Address,
    pub selectors: Vec<Selector>,
    pub targets: Vec<Address>,
}

impl Registration {
    pub const SIGNATURE: &'static str = "registerApp(bytes32,address,bytes4[],address[])";

    pub fn selector() -> Selector {
        Selector::from_signature(Self::SIGNATURE)
    }

    pub fn decode(args: &mut CalldataReader<'_>) -> EngineResult<Self> {
        let name = AppName::from_word(&args.read_word()?)?;
        let index = args.read_address()?;
        let selectors = args.read_selectors()?;
        let targets = args.read_addresses()?;
        args.finish()?;
        Ok(Self {
            name,
            index,
            selectors,
            targets,
        })
    }

    pub fn to_calldata(&self) -> Vec<u8> {
        CalldataBuilder::new(Self::selector())
            .word(&self.name.to_word())
            .address(&self.index)
            .selectors(&self.selectors)
            .addresses(&self.targets)
            .to_bytes()
    }

    /// Structural checks independent of what is already registered.
    pub fn validate(&self, max_selectors: usize) -> EngineResult<()> {
        if self.selectors.len() != self.targets.len() {
            return Err(EngineError::LengthMismatch {
                selectors: self.selectors.len(),
                targets: self.targets.len(),
            });
        }
        if self.selectors.is_empty() {
            return Err(EngineError::invalid_registration("no selectors given"));
        }
        if self.selectors.len() > max_selectors {
            return Err(EngineError::limit_exceeded(
                "selectors per application",
                max_selectors,
                self.selectors.len(),
            ));
        }
        if self.index.is_zero() || self.targets.iter().any(Address::is_zero) {
            return Err(EngineError::invalid_registration("zero implementation address"));
        }
        let mut seen = BTreeSet::new();
        if let Some(dup) = self.selectors.iter().find(|s| !seen.insert(**s)) {
            return Err(EngineError::invalid_registration(format!("selector {dup} listed twice")));
        }
        Ok(())
    }
}

/// One registered version of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationRecord {
    pub name: AppName,
    pub provider: Address,
    pub version: u64,
    pub index: Address,
    pub entries: Vec<(Selector, Address)>,
    pub locked: bool,
}

impl ApplicationRecord {
    pub fn target_for(&self, selector: &Selector) -> Option<Address> {
        self.entries
            .iter()
            .find(|(s, _)| s == selector)
            .map(|(_, target)| *target)
    }

    /// Distinct targets in order of first appearance.
    pub fn targets(&self) -> Vec<Address> {
        let mut seen = BTreeSet::new();
        self.entries
            .iter()
            .filter(|(_, target)| seen.insert(*target))
            .map(|(_, target)| *target)
            .collect()
    }
}

mod keys {
    use scriptexec_primitives::Selector;
    use scriptexec_store::FieldKey;

    use super::AppName;

    pub fn marker() -> FieldKey {
        FieldKey::new("registry")
    }

    pub fn app_count() -> FieldKey {
        FieldKey::new("apps").add_str("count")
    }

    pub fn app_at(index: u64) -> FieldKey {
        FieldKey::new("apps").add_u64(index)
    }

    fn app(name: &AppName) -> FieldKey {
        FieldKey::new("app").add_str(name.as_str())
    }

    pub fn provider(name: &AppName) -> FieldKey {
        app(name).add_str("provider")
    }

    pub fn latest(name: &AppName) -> FieldKey {
        app(name).add_str("version")
    }

    pub fn version(name: &AppName, version: u64, part: &str) -> FieldKey {
        app(name).add_str("v").add_u64(version).add_str(part)
    }

    pub fn selector_at(name: &AppName, version: u64, index: u64) -> FieldKey {
        self::version(name, version, "selector").add_u64(index)
    }

    pub fn target_at(name: &AppName, version: u64, index: u64) -> FieldKey {
        self::version(name, version, "target").add_u64(index)
    }

    pub fn route(name: &AppName, version: u64, selector: &Selector) -> FieldKey {
        self::version(name, version, "sel").add_selector(selector)
    }
}

/// Read access to a registry instance, plus staging of registry writes.
#[derive(Debug, Clone, Copy)]
pub struct ApplicationRegistry<'a> {
    view: StorageView<'a>,
}

impl<'a> ApplicationRegistry<'a> {
    /// Wraps the application namespace view of a registry instance.
    pub fn new(view: StorageView<'a>) -> Self {
        Self { view }
    }

    pub fn is_registry(&self) -> EngineResult<bool> {
        self.view.read_bool(&keys::marker())
    }

    pub(crate) fn stage_marker(writes: &mut WriteSet) {
        writes.write(keys::marker(), true);
    }

    pub fn provider_of(&self, name: &AppName) -> EngineResult<Option<Address>> {
        let provider = self.view.read_address(&keys::provider(name))?;
        Ok((!provider.is_zero()).then_some(provider))
    }

    /// Latest published version, `0` if the name is not registered.
    pub fn latest_version(&self, name: &AppName) -> EngineResult<u64> {
        self.view.read_u64(&keys::latest(name))
    }

    pub fn is_locked(&self, name: &AppName, version: u64) -> EngineResult<bool> {
        self.view.read_bool(&keys::version(name, version, "locked"))
    }

    pub fn record(&self, name: &AppName, version: u64) -> EngineResult<Option<ApplicationRecord>> {
        let latest = self.latest_version(name)?;
        if version == 0 || version > latest {
            return Ok(None);
        }
        let count = self.view.read_u64(&keys::version(name, version, "count"))?;
        let mut entries = Vec::with_capacity(count as usize);
        for i in 0..count {
            let selector = Selector::from_word(&self.view.read(&keys::selector_at(name, version, i))?)
                .map_err(EngineError::from_stored)?;
            let target = self.view.read_address(&keys::target_at(name, version, i))?;
            entries.push((selector, target));
        }
        Ok(Some(ApplicationRecord {
            name: name.clone(),
            provider: self.view.read_address(&keys::provider(name))?,
            version,
            index: self.view.read_address(&keys::version(name, version, "index"))?,
            entries,
            locked: self.is_locked(name, version)?,
        }))
    }

    /// Latest version of `name`.
    pub fn lookup(&self, name: &AppName) -> EngineResult<Option<ApplicationRecord>> {
        let latest = self.latest_version(name)?;
        self.record(name, latest)
    }

    /// Target servicing `selector` in one version, without loading the whole record.
    pub fn resolve(
        &self,
        name: &AppName,
        version: u64,
        selector: &Selector,
    ) -> EngineResult<Option<Address>> {
        let target = self.view.read_address(&keys::route(name, version, selector))?;
        Ok((!target.is_zero()).then_some(target))
    }

    pub fn app_names(&self) -> EngineResult<Vec<AppName>> {
        let count = self.view.read_u64(&keys::app_count())?;
        (0..count)
            .map(|i| AppName::from_word(&self.view.read(&keys::app_at(i))?))
            .collect()
    }

    /// Stages a registration on behalf of `provider`.
    ///
    /// # Errors
    ///
    /// `DuplicateName` if another provider owns the name, otherwise whatever
    /// [`Registration::validate`] reports.
    pub fn register(
        &self,
        writes: &mut WriteSet,
        provider: Address,
        registration: &Registration,
        max_selectors: usize,
    ) -> EngineResult<ApplicationRecord> {
        let name = &registration.name;
        if let Some(owner) = self.provider_of(name)? {
            if owner != provider {
                return Err(EngineError::DuplicateName {
                    name: name.to_string(),
                    owner,
                });
            }
        }
        registration.validate(max_selectors)?;

        let latest = self.latest_version(name)?;
        let version = if latest == 0 {
            let count = self.view.read_u64(&keys::app_count())?;
            writes
                .write(keys::app_at(count), name.to_word())
                .write(keys::app_count(), count + 1)
                .write(keys::provider(name), provider);
            1
        } else if self.is_locked(name, latest)? {
            latest + 1
        } else {
            self.clear_stale(writes, name, latest, registration)?;
            latest
        };
        if version != latest {
            writes.write(keys::latest(name), version);
        }

        writes
            .write(keys::version(name, version, "index"), registration.index)
            .write(
                keys::version(name, version, "count"),
                registration.selectors.len() as u64,
            );
        let entries: Vec<(Selector, Address)> = registration
            .selectors
            .iter()
            .copied()
            .zip(registration.targets.iter().copied())
            .collect();
        for (i, (selector, target)) in entries.iter().enumerate() {
            let i = i as u64;
            writes
                .write(keys::selector_at(name, version, i), selector.to_word())
                .write(keys::target_at(name, version, i), *target)
                .write(keys::route(name, version, selector), *target);
        }

        info!(
            app = %name,
            version,
            selectors = entries.len(),
            %provider,
            "registered application"
        );
        Ok(ApplicationRecord {
            name: name.clone(),
            provider,
            version,
            index: registration.index,
            entries,
            locked: false,
        })
    }

    /// Zeroes routes and table slots of an unlocked version that the new
    /// registration no longer contains.
    fn clear_stale(
        &self,
        writes: &mut WriteSet,
        name: &AppName,
        version: u64,
        registration: &Registration,
    ) -> EngineResult<()> {
        let Some(previous) = self.record(name, version)? else {
            return Ok(());
        };
        for (selector, _) in &previous.entries {
            if !registration.selectors.contains(selector) {
                writes.write(keys::route(name, version, selector), H256::ZERO);
            }
        }
        for i in registration.selectors.len()..previous.entries.len() {
            let i = i as u64;
            writes
                .write(keys::selector_at(name, version, i), H256::ZERO)
                .write(keys::target_at(name, version, i), H256::ZERO);
        }
        Ok(())
    }

    /// Stages the lock of one version. Returns `false` if it was already locked.
    pub fn stage_lock(&self, writes: &mut WriteSet, name: &AppName, version: u64) -> EngineResult<bool> {
        if self.is_locked(name, version)? {
            return Ok(false);
        }
        writes.write(keys::version(name, version, "locked"), true);
        Ok(true)
    }
}
