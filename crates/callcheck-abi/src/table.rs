//! Symbol table mapping exported routine names to dispatchable bindings.

use std::collections::BTreeMap;

use callcheck_core::{RegistryError, TestCase};

use crate::binding::RoutineBinding;

/// Name-to-binding map for every routine a run may touch.
///
/// Like the case registry this is a plain value, so a test can build a
/// private table with a deliberately misbehaving routine without affecting
/// any other table in the process.
#[derive(Debug, Default)]
pub struct RoutineTable {
    bindings: BTreeMap<String, RoutineBinding>,
}

impl RoutineTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `symbol` to `binding`. Rebinding an existing symbol replaces
    /// the previous binding, which is how tests shadow a stock routine.
    pub fn bind(&mut self, symbol: impl Into<String>, binding: RoutineBinding) {
        self.bindings.insert(symbol.into(), binding);
    }

    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<RoutineBinding> {
        self.bindings.get(symbol).copied()
    }

    /// Resolve the binding a case will be dispatched through.
    ///
    /// Fails when the symbol is unbound or when the case's declared
    /// signature does not fit the bound shape. Both are configuration
    /// errors: they abort a run before any routine is invoked.
    pub fn resolve(&self, case: &TestCase) -> Result<RoutineBinding, RegistryError> {
        let Some(binding) = self.get(&case.symbol) else {
            return Err(RegistryError::UnknownSymbol {
                case: case.name.clone(),
                symbol: case.symbol.clone(),
            });
        };
        let sig = case.signature();
        if !binding.accepts(&sig) {
            return Err(RegistryError::SignatureMismatch {
                case: case.name.clone(),
                symbol: case.symbol.clone(),
                declared: sig,
                shape: binding.shape_name(),
            });
        }
        Ok(binding)
    }

    /// Bound symbol names in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
