//! The vex64 linker.
//!
//! Merges object modules into a single executable image:
//! 1. **Layout:** Concatenates each module's text, data, and bss in
//!    input order; segments sit at fixed bases (text at `TEXT_BASE`,
//!    then data, then bss, each aligned to `SEGMENT_ALIGN`).
//! 2. **Resolution:** Builds one global symbol table; global symbols
//!    must be unique across the link, extern references must match a
//!    global definition somewhere in the input set.
//! 3. **Patching:** Applies every relocation exactly once, adding the
//!    resolved value into the patch site (addend-in-place) and failing
//!    on overflow of the declared width.
//!
//! All state is scoped to a single [`link`] call; repeated calls are
//! independent and reentrant. The standard-library set is linked like
//! any other input, with no special resolution order.

use std::collections::BTreeMap;

use tracing::debug;

use crate::common::constants::{align_up, SEGMENT_ALIGN, TEXT_BASE};
use crate::common::object::{RelocKind, Visibility};
use crate::common::{Executable, LinkError, ObjectModule, SegmentKind};

/// Per-module placement: base offset of each segment within the merged
/// segment, in input order.
struct Placement {
    text: u64,
    data: u64,
    bss: u64,
}

/// Links object modules into an executable.
///
/// # Arguments
///
/// * `modules` - Ordered modules, including any standard-library set
///   the caller wants resolved.
/// * `entry` - Segment and symbol name execution starts at; the symbol
///   must be a global defined in that segment.
///
/// # Errors
///
/// [`LinkError`] for duplicate globals, unresolved externs, relocation
/// overflow, or an unresolvable entry point.
pub fn link(modules: &[ObjectModule], entry: (SegmentKind, &str)) -> Result<Executable, LinkError> {
    // Segment layout: per-module bases are running totals.
    let mut placements = Vec::with_capacity(modules.len());
    let (mut text_total, mut data_total, mut bss_total) = (0u64, 0u64, 0u64);
    for module in modules {
        placements.push(Placement { text: text_total, data: data_total, bss: bss_total });
        text_total += module.text.len() as u64;
        data_total += module.data.len() as u64;
        bss_total += module.bss_len;
    }

    let text_base = TEXT_BASE;
    let data_base = align_up(text_base + text_total, SEGMENT_ALIGN);
    let bss_base = align_up(data_base + data_total, SEGMENT_ALIGN);
    debug!(text_base, data_base, bss_base, modules = modules.len(), "image layout");

    // One global symbol table: name -> (absolute address, segment).
    let mut global: BTreeMap<&str, (u64, SegmentKind, &str)> = BTreeMap::new();
    for (module, place) in modules.iter().zip(&placements) {
        for (sym_name, sym) in &module.symbols {
            if sym.visibility != Visibility::Global {
                continue;
            }
            let addr = absolute(sym.segment, sym.offset, place, text_base, data_base, bss_base);
            if let Some(&(_, _, first)) = global.get(sym_name.as_str()) {
                return Err(LinkError::DuplicateSymbol {
                    name: sym_name.clone(),
                    first: first.to_string(),
                    second: module.name.clone(),
                });
            }
            let _ = global.insert(sym_name.as_str(), (addr, sym.segment, module.name.as_str()));
        }
    }

    // Merge segment bytes.
    let mut text = Vec::with_capacity(text_total as usize);
    let mut data = Vec::with_capacity(data_total as usize);
    for module in modules {
        text.extend_from_slice(&module.text);
        data.extend_from_slice(&module.data);
    }

    // Apply every relocation from every module.
    let mut patched = 0usize;
    for (module, place) in modules.iter().zip(&placements) {
        for reloc in &module.relocations {
            let target = match module.symbols.get(&reloc.symbol) {
                Some(sym) if sym.visibility != Visibility::Extern => {
                    absolute(sym.segment, sym.offset, place, text_base, data_base, bss_base)
                }
                _ => match global.get(reloc.symbol.as_str()) {
                    Some(&(addr, _, _)) => addr,
                    None => {
                        return Err(LinkError::UnresolvedSymbol {
                            name: reloc.symbol.clone(),
                            module: module.name.clone(),
                        });
                    }
                },
            };

            let (buf, merged_off, patch_addr) = match reloc.segment {
                SegmentKind::Text => {
                    let off = place.text + reloc.offset;
                    (&mut text, off, text_base + off)
                }
                SegmentKind::Data => {
                    let off = place.data + reloc.offset;
                    (&mut data, off, data_base + off)
                }
                SegmentKind::Bss => {
                    // The assembler never emits patch sites in bss.
                    return Err(LinkError::UnresolvedSymbol {
                        name: reloc.symbol.clone(),
                        module: module.name.clone(),
                    });
                }
            };

            let width = u64::from(reloc.width);
            let value = match reloc.kind {
                RelocKind::Absolute => i128::from(target),
                RelocKind::Relative => i128::from(target) - i128::from(patch_addr + width),
            };
            let site = &mut buf[merged_off as usize..(merged_off + width) as usize];
            let total = value + i128::from(read_addend(site));
            if !fits(total, reloc.width, reloc.kind) {
                return Err(LinkError::RelocationOverflow {
                    symbol: reloc.symbol.clone(),
                    width: reloc.width,
                    value: total,
                });
            }
            site.copy_from_slice(&total.to_le_bytes()[..width as usize]);
            patched += 1;
        }
    }
    debug!(patched, symbols = global.len(), "relocations applied");

    // Entry point resolution, via the global table only.
    let entry_addr = match global.get(entry.1) {
        Some(&(addr, segment, _)) if segment == entry.0 => addr,
        _ => {
            return Err(LinkError::BadEntryPoint {
                segment: entry.0,
                name: entry.1.to_string(),
            });
        }
    };

    let debug_symbols = global
        .iter()
        .map(|(name, &(addr, _, _))| ((*name).to_string(), addr))
        .collect();

    Ok(Executable {
        text,
        data,
        bss_len: bss_total,
        text_base,
        data_base,
        bss_base,
        entry: entry_addr,
        debug_symbols: Some(debug_symbols),
    })
}

/// Absolute address of an offset inside a module's segment.
fn absolute(
    segment: SegmentKind,
    offset: u64,
    place: &Placement,
    text_base: u64,
    data_base: u64,
    bss_base: u64,
) -> u64 {
    match segment {
        SegmentKind::Text => text_base + place.text + offset,
        SegmentKind::Data => data_base + place.data + offset,
        SegmentKind::Bss => bss_base + place.bss + offset,
    }
}

/// Reads a patch site's current contents as a sign-extended addend.
fn read_addend(site: &[u8]) -> i64 {
    let mut bytes = [0u8; 8];
    bytes[..site.len()].copy_from_slice(site);
    let raw = i64::from_le_bytes(bytes);
    let shift = 64 - site.len() as u32 * 8;
    if shift == 0 { raw } else { raw << shift >> shift }
}

/// Whether a computed relocation value fits its declared width.
///
/// Absolute values may occupy the field as signed or unsigned; relative
/// displacements must fit as signed.
fn fits(value: i128, width: u8, kind: RelocKind) -> bool {
    if width == 8 {
        return match kind {
            RelocKind::Absolute => u64::try_from(value).is_ok() || i64::try_from(value).is_ok(),
            RelocKind::Relative => i64::try_from(value).is_ok(),
        };
    }
    let bits = u32::from(width) * 8;
    let signed_min = -(1i128 << (bits - 1));
    let signed_max = (1i128 << (bits - 1)) - 1;
    let unsigned_max = (1i128 << bits) - 1;
    match kind {
        RelocKind::Absolute => value >= signed_min && value <= unsigned_max,
        RelocKind::Relative => value >= signed_min && value <= signed_max,
    }
}
