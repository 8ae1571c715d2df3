//! Derivation resolution - replays pin edits on a copy of the base pin list

use std::collections::HashSet;

use log::{debug, trace};

use super::registry::{ResolvedSymbol, SymbolRegistry};
use crate::error::SymbolError;
use crate::parser::ast::Spanned;
use crate::table::{Lineage, PinEdit, PinSlot, SymbolAttributes, SymbolSpec};

/// Where a slot of a pin list under edit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Inherited,
    Inserted,
}

/// Resolve one symbol against the already resolved symbols
///
/// Pure with respect to its inputs: the registry is only read.
pub fn resolve_symbol(
    spec: &SymbolSpec,
    registry: &SymbolRegistry,
) -> Result<ResolvedSymbol, Spanned<SymbolError>> {
    let at_symbol = |e: SymbolError| Spanned::new(e, spec.span.clone());

    let resolved = match &spec.lineage {
        Lineage::Base { pins } => ResolvedSymbol {
            name: spec.name.clone(),
            attributes: SymbolAttributes::from_set(&spec.attributes),
            inherited: spec.attributes.clone(),
            pins: pins.clone(),
            extends: None,
            file: spec.file,
            span: spec.span.clone(),
        },
        Lineage::Derived { base, edits } => {
            let parent = registry.lookup_base(&spec.name, base).map_err(at_symbol)?;
            let inherited = spec.attributes.inherit_from(&parent.inherited);
            let pins = apply_edits(&spec.name, &parent.pins, edits)?;
            check_unique_numbers(&spec.name, &pins).map_err(at_symbol)?;
            debug!(
                "derived '{}' from '{}' with {} edits",
                spec.name,
                base,
                edits.len()
            );
            ResolvedSymbol {
                name: spec.name.clone(),
                attributes: SymbolAttributes::from_set(&inherited),
                inherited,
                pins,
                extends: None,
                file: spec.file,
                span: spec.span.clone(),
            }
        }
        Lineage::Alias { base } => {
            let parent = registry.lookup_base(&spec.name, base).map_err(at_symbol)?;
            // KiCad only knows one level of `extends`
            let root = parent.root().to_string();
            debug!("alias '{}' extends '{}'", spec.name, root);
            ResolvedSymbol {
                name: spec.name.clone(),
                attributes: SymbolAttributes::from_set(&spec.attributes),
                inherited: spec.attributes.clone(),
                pins: parent.pins.clone(),
                extends: Some(root),
                file: spec.file,
                span: spec.span.clone(),
            }
        }
    };
    Ok(resolved)
}

/// Apply `edits` in order to a copy of `base`
pub fn apply_edits(
    symbol: &str,
    base: &[PinSlot],
    edits: &[PinEdit],
) -> Result<Vec<PinSlot>, Spanned<SymbolError>> {
    let mut working: Vec<(PinSlot, Origin)> = base
        .iter()
        .cloned()
        .map(|slot| (slot, Origin::Inherited))
        .collect();

    for edit in edits {
        let index = find_target(&working, edit, symbol)
            .map_err(|e| Spanned::new(e, edit.span().clone()))?;
        trace!("{} {} at index {}", edit.verb(), edit.target(), index);

        match edit {
            PinEdit::Delete { .. } => {
                working.remove(index);
            }
            PinEdit::InsertBefore { slots, .. } => {
                let inserted = slots.iter().cloned().map(|s| (s, Origin::Inserted));
                working.splice(index..index, inserted);
            }
            PinEdit::InsertAfter { slots, .. } => {
                let inserted = slots.iter().cloned().map(|s| (s, Origin::Inserted));
                working.splice(index + 1..index + 1, inserted);
            }
            PinEdit::Overload { pin, .. } => {
                working[index].0 = PinSlot::Pin(pin.clone());
            }
        }
    }

    Ok(working.into_iter().map(|(slot, _)| slot).collect())
}

/// A unique inherited match wins over inserted pins; otherwise the target
/// must match exactly one pin.
fn find_target(
    working: &[(PinSlot, Origin)],
    edit: &PinEdit,
    symbol: &str,
) -> Result<usize, SymbolError> {
    let target = edit.target();
    let matches: Vec<usize> = working
        .iter()
        .enumerate()
        .filter(|(_, (slot, _))| slot.as_pin().is_some_and(|pin| target.matches(pin)))
        .map(|(i, _)| i)
        .collect();
    let inherited: Vec<usize> = matches
        .iter()
        .copied()
        .filter(|&i| working[i].1 == Origin::Inherited)
        .collect();

    match (inherited.as_slice(), matches.as_slice()) {
        ([only], _) | (_, [only]) => Ok(*only),
        (_, []) => Err(SymbolError::EditTargetNotFound {
            edit: edit.verb(),
            target: target.to_string(),
            symbol: symbol.to_string(),
        }),
        _ => Err(SymbolError::AmbiguousEditTarget {
            edit: edit.verb(),
            target: target.to_string(),
            symbol: symbol.to_string(),
            count: matches.len(),
        }),
    }
}

fn check_unique_numbers(symbol: &str, pins: &[PinSlot]) -> Result<(), SymbolError> {
    let mut seen = HashSet::new();
    for pin in pins.iter().filter_map(PinSlot::as_pin) {
        if !seen.insert(pin.number.as_str()) {
            return Err(SymbolError::DuplicatePinNumber {
                number: pin.number.clone(),
                symbol: symbol.to_string(),
            });
        }
    }
    Ok(())
}
