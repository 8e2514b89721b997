//! Mechanism registry — catalogue of clearing mechanisms by tag.
//!
//! # Purpose
//! Periods name their mechanism by [`MechanismKind`]; the registry is where
//! the tag becomes an instance. Each entry pairs a tag with a factory
//! closure producing a fresh `Box<dyn Mechanism>`, so discovery stays
//! decoupled from execution and callers can install their own mechanisms
//! under the reserved tags.
//!
//! # Availability probe
//! [`MechanismRegistry::is_available`] resolves the tag and invokes the
//! mechanism with an empty bid set at zero supply and zero floor. Reserved
//! tags fail to resolve, so the probe reports `false` for them without any
//! special-casing.
//!
//! # Determinism
//! Entries keep insertion order; [`MechanismRegistry::kinds`] enumerates
//! every known tag (implemented and reserved) in canonical order.

use crate::types::{Mechanism, MechanismError, MechanismKind};
use crate::{SecondPrice, UniformPrice};

/// A thread-safe factory closure producing a fresh mechanism instance.
pub type MechanismFactory = Box<dyn Fn() -> Box<dyn Mechanism> + Send + Sync>;

struct RegistryEntry {
    kind: MechanismKind,
    factory: MechanismFactory,
}

/// Catalogue mapping mechanism tags to factories.
pub struct MechanismRegistry {
    entries: Vec<RegistryEntry>,
}

impl MechanismRegistry {
    /// An empty registry with no mechanisms at all.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A registry with the two implemented mechanisms installed.
    pub fn with_builtins() -> Self {
        let mut reg = Self::empty();
        reg.register(MechanismKind::SecondPrice, || Box::new(SecondPrice))
            .expect("empty registry accepts builtin");
        reg.register(MechanismKind::UniformPrice, || Box::new(UniformPrice))
            .expect("empty registry accepts builtin");
        reg
    }

    /// Install a factory under a tag.
    ///
    /// # Errors
    /// [`MechanismError::DuplicateKind`] if the tag already has a factory.
    pub fn register<F>(&mut self, kind: MechanismKind, factory: F) -> Result<(), MechanismError>
    where
        F: Fn() -> Box<dyn Mechanism> + Send + Sync + 'static,
    {
        if self.entries.iter().any(|e| e.kind == kind) {
            return Err(MechanismError::DuplicateKind { kind });
        }
        self.entries.push(RegistryEntry {
            kind,
            factory: Box::new(factory),
        });
        Ok(())
    }

    /// Every known tag in canonical order, whether or not implemented.
    pub fn kinds(&self) -> Vec<MechanismKind> {
        MechanismKind::ALL.to_vec()
    }

    /// Instantiate the mechanism registered under `kind`.
    ///
    /// # Errors
    /// [`MechanismError::Unimplemented`] for tags without a factory —
    /// reserved tags hit this at period time.
    pub fn resolve(&self, kind: MechanismKind) -> Result<Box<dyn Mechanism>, MechanismError> {
        self.entries
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| (e.factory)())
            .ok_or(MechanismError::Unimplemented { kind })
    }

    /// Probe whether `kind` can actually clear: resolve it and run an empty
    /// bid set at zero supply and zero floor.
    pub fn is_available(&self, kind: MechanismKind) -> bool {
        match self.resolve(kind) {
            Ok(mech) => mech
                .clear(&[], rust_decimal::Decimal::ZERO, rust_decimal::Decimal::ZERO)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl Default for MechanismRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
