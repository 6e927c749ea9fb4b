//! Fixed label-to-pin table
//!
//! Established once at startup (from configuration or the default
//! Red/Green/Yellow wiring) and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::pin::PinId;
use crate::error::{PinError, Result};

/// One LED: a human-readable label wired to a pin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedBinding {
    pub label: String,
    pub pin: PinId,
}

impl LedBinding {
    pub fn new(label: impl Into<String>, pin: u8) -> Self {
        Self {
            label: label.into(),
            pin: PinId::new(pin),
        }
    }
}

/// Ordered, validated set of LED bindings
///
/// Order matters: it is the order controls are shown in the GUI and the
/// index a dimmer slider refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LedBinding>", into = "Vec<LedBinding>")]
pub struct LedMap {
    bindings: Vec<LedBinding>,
}

impl LedMap {
    /// Build a map, rejecting empty maps and duplicate labels or pins
    pub fn new(bindings: Vec<LedBinding>) -> Result<Self> {
        if bindings.is_empty() {
            return Err(PinError::InvalidLedMap("at least one LED is required".into()));
        }

        let mut labels = HashSet::new();
        let mut pins = HashSet::new();
        for binding in &bindings {
            if binding.label.trim().is_empty() {
                return Err(PinError::InvalidLedMap("LED labels cannot be empty".into()));
            }
            if !labels.insert(binding.label.as_str()) {
                return Err(PinError::InvalidLedMap(format!(
                    "duplicate label '{}'",
                    binding.label
                )));
            }
            if !pins.insert(binding.pin) {
                return Err(PinError::InvalidLedMap(format!(
                    "{} is mapped more than once",
                    binding.pin
                )));
            }
        }

        Ok(Self { bindings })
    }

    /// Pin wired to `label` (exact, case-sensitive match)
    pub fn get(&self, label: &str) -> Option<PinId> {
        self.bindings
            .iter()
            .find(|binding| binding.label == label)
            .map(|binding| binding.pin)
    }

    /// Binding at a control index
    pub fn binding(&self, index: usize) -> Option<&LedBinding> {
        self.bindings.get(index)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.bindings.iter().position(|binding| binding.label == label)
    }

    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.bindings.iter().map(|binding| binding.pin)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.bindings.iter().map(|binding| binding.label.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LedBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Always false for a constructed map; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for LedMap {
    fn default() -> Self {
        Self {
            bindings: vec![
                LedBinding::new("Red", 17),
                LedBinding::new("Green", 27),
                LedBinding::new("Yellow", 22),
            ],
        }
    }
}

impl TryFrom<Vec<LedBinding>> for LedMap {
    type Error = PinError;

    fn try_from(bindings: Vec<LedBinding>) -> Result<Self> {
        Self::new(bindings)
    }
}

impl From<LedMap> for Vec<LedBinding> {
    fn from(map: LedMap) -> Self {
        map.bindings
    }
}

impl<'a> IntoIterator for &'a LedMap {
    type Item = &'a LedBinding;
    type IntoIter = std::slice::Iter<'a, LedBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}
