//! # Note Fragments
//!
//! A fragment is one written note or rest. A sounding note whose length has
//! no single symbol (or that crosses a barline) is written as several
//! fragments joined by ties.
//!
//! ## Ties
//! - `tie_stop`: the fragment continues an earlier fragment
//! - `tie_start`: the fragment continues into a later fragment
//! - Both set: middle of a tied chain
//!
//! Inside one compound duration every boundary is tied. The caller decides
//! whether the chain as a whole is tied into ([`build_note`]'s `tie_in`) and
//! out of (`tie_out`) its neighbours in other measures.

use crate::duration::{decompose, DurationSymbol};
use crate::pitch::Pitch;

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// `None` for rests
    pub pitch: Option<Pitch>,
    /// Length in divisions; exact, even when the symbol is nominal
    pub duration: u32,
    /// `None` only for a rest that fills a measure no single symbol can
    pub symbol: Option<DurationSymbol>,
    pub tie_stop: bool,
    pub tie_start: bool,
    pub voice: u32,
}

impl Fragment {
    pub fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }

    pub fn dots(&self) -> u8 {
        self.symbol.map_or(0, |s| s.dots)
    }
}

/// Write a pitched note of `total` divisions as a chain of tied fragments.
///
/// Every symbol but the last contributes its nominal length; the last takes
/// whatever is left of `total`, so the fragments always sum to `total`.
pub fn build_note(
    pitch: Pitch,
    total: u32,
    symbols: &[DurationSymbol],
    tie_in: bool,
    tie_out: bool,
    voice: u32,
) -> Vec<Fragment> {
    let mut remaining = total;
    let last = symbols.len().saturating_sub(1);

    symbols
        .iter()
        .enumerate()
        .map(|(i, symbol)| {
            let duration = if i == last {
                remaining
            } else {
                let nominal = symbol.divisions().min(remaining);
                remaining -= nominal;
                nominal
            };
            Fragment {
                pitch: Some(pitch),
                duration,
                symbol: Some(*symbol),
                tie_stop: i > 0 || tie_in,
                tie_start: i < last || tie_out,
                voice,
            }
        })
        .collect()
}

/// A single rest of exactly `total` divisions.
pub fn build_rest(total: u32) -> Fragment {
    Fragment {
        pitch: None,
        duration: total,
        symbol: decompose(total).single(),
        tie_stop: false,
        tie_start: false,
        voice: 1,
    }
}
