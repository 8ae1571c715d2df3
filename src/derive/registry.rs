//! Registry of symbols in declaration order

use std::collections::{HashMap, HashSet};

use crate::error::SymbolError;
use crate::parser::ast::Span;
use crate::table::{AttributeSet, PinSlot, SymbolAttributes};

/// A symbol with its final attributes and pin list
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSymbol {
    pub name: String,
    pub attributes: SymbolAttributes,
    /// Attribute values after inheritance, passed on to derived symbols
    pub inherited: AttributeSet,
    pub pins: Vec<PinSlot>,
    /// Set for `extends` aliases: the symbol KiCad draws for this one
    pub extends: Option<String>,
    pub file: usize,
    pub span: Span,
}

impl ResolvedSymbol {
    pub fn is_alias(&self) -> bool {
        self.extends.is_some()
    }

    /// Name of the symbol whose body and pins are drawn
    pub fn root(&self) -> &str {
        self.extends.as_deref().unwrap_or(&self.name)
    }
}

/// Symbols are declared up front so that references to later symbols can be
/// told apart from unknown names, then resolved one by one in the same order.
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    order: Vec<String>,
    positions: HashMap<String, usize>,
    resolved: HashMap<String, ResolvedSymbol>,
    failed: HashSet<String>,
}

impl SymbolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a name in declaration order
    pub fn declare(&mut self, name: &str) -> Result<(), SymbolError> {
        if self.positions.contains_key(name) {
            return Err(SymbolError::DuplicateSymbol {
                name: name.to_string(),
            });
        }
        self.positions.insert(name.to_string(), self.order.len());
        self.order.push(name.to_string());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Store the result of a successful resolution
    pub fn insert(&mut self, symbol: ResolvedSymbol) {
        self.resolved.insert(symbol.name.clone(), symbol);
    }

    /// Record that a declared symbol could not be built or resolved
    pub fn mark_failed(&mut self, name: &str) {
        self.failed.insert(name.to_string());
    }

    pub fn is_failed(&self, name: &str) -> bool {
        self.failed.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedSymbol> {
        self.resolved.get(name)
    }

    /// Find the base `base` of `symbol`, enforcing declaration order
    pub fn lookup_base(&self, symbol: &str, base: &str) -> Result<&ResolvedSymbol, SymbolError> {
        if symbol == base {
            return Err(SymbolError::CircularDerivation {
                symbol: symbol.to_string(),
            });
        }
        let Some(&base_position) = self.positions.get(base) else {
            return Err(SymbolError::UnknownBase {
                base: base.to_string(),
                symbol: symbol.to_string(),
            });
        };
        if self
            .positions
            .get(symbol)
            .is_some_and(|&own| base_position > own)
        {
            return Err(SymbolError::ForwardReference {
                base: base.to_string(),
                symbol: symbol.to_string(),
            });
        }
        self.resolved
            .get(base)
            .filter(|_| !self.is_failed(base))
            .ok_or_else(|| SymbolError::BaseUnresolved {
                base: base.to_string(),
                symbol: symbol.to_string(),
            })
    }

    /// Resolved symbols in declaration order
    pub fn symbols(&self) -> impl Iterator<Item = &ResolvedSymbol> {
        self.order.iter().filter_map(|name| self.resolved.get(name))
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(name: &str) -> ResolvedSymbol {
        ResolvedSymbol {
            name: name.to_string(),
            attributes: SymbolAttributes::default(),
            inherited: AttributeSet::new(),
            pins: Vec::new(),
            extends: None,
            file: 0,
            span: 0..1,
        }
    }

    #[test]
    fn test_registry_declare_and_get() {
        let mut registry = SymbolRegistry::new();
        registry.declare("A").expect("Should declare");
        registry.insert(symbol("A"));
        assert!(registry.contains("A"));
        assert!(registry.get("A").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_duplicate_error() {
        let mut registry = SymbolRegistry::new();
        registry.declare("A").expect("First declare should succeed");
        let result = registry.declare("A");
        assert!(matches!(result, Err(SymbolError::DuplicateSymbol { .. })));
    }

    #[test]
    fn test_lookup_base_rules() {
        let mut registry = SymbolRegistry::new();
        for name in ["A", "B", "C", "D"] {
            registry.declare(name).unwrap();
        }
        registry.insert(symbol("A"));
        registry.mark_failed("C");
        assert!(registry.is_failed("C"));
        assert!(!registry.is_failed("A"));

        assert!(registry.lookup_base("B", "A").is_ok());
        assert!(matches!(
            registry.lookup_base("B", "B"),
            Err(SymbolError::CircularDerivation { .. })
        ));
        assert!(matches!(
            registry.lookup_base("B", "Z"),
            Err(SymbolError::UnknownBase { .. })
        ));
        assert!(matches!(
            registry.lookup_base("B", "D"),
            Err(SymbolError::ForwardReference { .. })
        ));
        assert!(matches!(
            registry.lookup_base("D", "C"),
            Err(SymbolError::BaseUnresolved { .. })
        ));
    }

    #[test]
    fn test_symbols_in_declaration_order() {
        let mut registry = SymbolRegistry::new();
        for name in ["Z", "A", "M"] {
            registry.declare(name).unwrap();
        }
        registry.insert(symbol("M"));
        registry.insert(symbol("Z"));
        let names: Vec<&str> = registry.symbols().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Z", "M"]);
    }
}
