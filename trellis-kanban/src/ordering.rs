//! Fractional ordering for items within a column.
//!
//! Orders are `f64` sort keys. Inserting between two neighbours takes the
//! midpoint, so a move never renumbers the rest of the column. Nothing here
//! renormalizes: enough insertions between the same two neighbours will
//! exhaust `f64` precision, which [`checked_insert_order`] can detect.
//!
//! Everything in this module is pure so the client can place a card
//! optimistically with exactly the arithmetic the server would use.

/// Order used when dropping into a column with no items
pub const EMPTY_COLUMN_ORDER: f64 = 1.0;

/// Which half of a candidate item the pointer is over during a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropZone {
    /// Insert before the candidate
    Top,
    /// Insert after the candidate
    Bottom,
}

impl DropZone {
    /// Resolve the zone from the pointer's vertical position and the
    /// candidate's bounding box. The midpoint itself counts as `Top`.
    pub fn resolve(pointer_y: f64, rect_top: f64, rect_bottom: f64) -> Self {
        let midpoint = (rect_top + rect_bottom) / 2.0;
        if pointer_y <= midpoint {
            Self::Top
        } else {
            Self::Bottom
        }
    }
}

/// Order for an entity inserted between `previous` and `next`.
///
/// - both absent (empty list): `1`
/// - only `previous` (append): `previous + 1`
/// - both present: the midpoint
/// - only `next` (insert at the head): halfway between zero and `next`, or
///   `next - 1` once orders have gone non-positive
pub fn compute_insert_order(previous: Option<f64>, next: Option<f64>) -> f64 {
    match (previous, next) {
        (None, None) => EMPTY_COLUMN_ORDER,
        (Some(previous), None) => previous + 1.0,
        (Some(previous), Some(next)) => (previous + next) / 2.0,
        (None, Some(next)) if next > 0.0 => next / 2.0,
        (None, Some(next)) => next - 1.0,
    }
}

/// Like [`compute_insert_order`], but `None` when the result would not land
/// strictly between the neighbours (precision exhausted or neighbours out of
/// order).
pub fn checked_insert_order(previous: Option<f64>, next: Option<f64>) -> Option<f64> {
    let order = compute_insert_order(previous, next);
    if !order.is_finite() {
        return None;
    }
    let after_previous = previous.map_or(true, |p| order > p);
    let before_next = next.map_or(true, |n| order < n);
    (after_previous && before_next).then_some(order)
}

/// Order for a new entity appended after `sorted` (ascending orders)
pub fn append_order(sorted: &[f64]) -> f64 {
    compute_insert_order(sorted.last().copied(), None)
}

/// Order for a drop onto `sorted[target]` in the given zone.
///
/// `sorted` holds the destination column's orders ascending, without the
/// item being dragged. An empty column always yields [`EMPTY_COLUMN_ORDER`];
/// a target index past the end appends.
pub fn drop_order(sorted: &[f64], target: usize, zone: DropZone) -> f64 {
    if sorted.is_empty() {
        return EMPTY_COLUMN_ORDER;
    }
    let Some(&anchor) = sorted.get(target) else {
        return append_order(sorted);
    };

    match zone {
        DropZone::Top => {
            let previous = target.checked_sub(1).map(|i| sorted[i]);
            compute_insert_order(previous, Some(anchor))
        }
        DropZone::Bottom => compute_insert_order(Some(anchor), sorted.get(target + 1).copied()),
    }
}
