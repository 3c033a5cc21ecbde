//! Variant resolution: exact attribute match, then best compatible fallback.

use crate::domain::aggregates::Variant;
use crate::domain::value_objects::Selection;

/// Points for each target key a candidate agrees with.
const MATCH_POINTS: u32 = 1;
/// Extra points when a candidate agrees with the key the viewer just changed.
const CHANGED_KEY_BOOST: u32 = 2;

/// Outcome of [`resolve_variant`].
#[derive(Clone, Copy, Debug)]
pub enum Resolution<'a> {
    /// Every identifying attribute of the variant is satisfied by the selection.
    Exact(&'a Variant),
    /// Closest active, in-stock variant; the caller should snap to its attributes.
    Fallback(&'a Variant),
}

impl<'a> Resolution<'a> {
    pub fn variant(&self) -> &'a Variant {
        match self { Self::Exact(v) | Self::Fallback(v) => v }
    }
    pub fn is_exact(&self) -> bool { matches!(self, Self::Exact(_)) }
}

#[derive(Clone, Copy, Debug)]
struct Candidate<'a> {
    variant: &'a Variant,
    score: u32,
    exact_key_match: bool,
}

/// Resolves `selection` against `variants`.
///
/// `changed_key` is the attribute the viewer just interacted with; it only
/// affects fallback ranking.
pub fn resolve_variant<'a>(variants: &'a [Variant], selection: &Selection, changed_key: Option<&str>) -> Option<Resolution<'a>> {
    if let Some(variant) = find_exact_match(variants, selection) {
        return Some(Resolution::Exact(variant));
    }
    best_compatible_variant(variants, selection, changed_key).map(Resolution::Fallback)
}

/// First variant whose identifying attributes are all satisfied by `selection`.
///
/// The selection may carry keys the variant does not have. Variants without a
/// usable attribute list never match.
pub fn find_exact_match<'a>(variants: &'a [Variant], selection: &Selection) -> Option<&'a Variant> {
    variants.iter().find(|v| {
        v.attributes().is_some_and(|attrs| attrs.iter().all(|a| selection.get(&a.key) == Some(a.value.as_str())))
    })
}

/// Highest ranked active, in-stock variant for `target`.
///
/// Ranking is `(matches changed key, score)` descending; ties keep list order.
pub fn best_compatible_variant<'a>(variants: &'a [Variant], target: &Selection, changed_key: Option<&str>) -> Option<&'a Variant> {
    let mut candidates: Vec<Candidate<'a>> = variants
        .iter()
        .filter(|v| v.is_candidate())
        .map(|v| score(v, target, changed_key))
        .collect();
    // Vec::sort_by is stable, so equal candidates stay in list order.
    candidates.sort_by(|a, b| b.exact_key_match.cmp(&a.exact_key_match).then(b.score.cmp(&a.score)));
    candidates.first().map(|c| c.variant)
}

fn score<'a>(variant: &'a Variant, target: &Selection, changed_key: Option<&str>) -> Candidate<'a> {
    let mut score = target
        .iter()
        .filter(|(key, value)| variant.value_of(key) == Some(value.as_str()))
        .count() as u32
        * MATCH_POINTS;

    let exact_key_match = changed_key
        .and_then(|key| target.get(key).map(|value| (key, value)))
        .is_some_and(|(key, value)| variant.value_of(key) == Some(value));
    if exact_key_match {
        score += CHANGED_KEY_BOOST;
    }
    Candidate { variant, score, exact_key_match }
}

/// Whether choosing `key = value` on top of `selection` still leads somewhere.
///
/// Used to render an option as selectable or disabled; never mutates state.
pub fn is_option_compatible(variants: &[Variant], selection: &Selection, key: &str, value: &str) -> bool {
    best_compatible_variant(variants, &selection.with(key, value), Some(key)).is_some()
}
