//! Range consolidation against a field comparator.

use std::cmp::Ordering;

use crate::condition::{Range, SingleValue};
use crate::value::{ComparisonError, ValueComparator};

/// Sorts ranges by lower bound and merges every pair that overlaps, touches
/// or is adjacent under `comparator.increment`.
///
/// Inclusive lower bounds sort before exclusive ones at the same value, and
/// the sort is stable, so merging an already merged list is a no-op.
pub(super) fn merge(
    comparator: &dyn ValueComparator,
    ranges: Vec<Range>,
) -> Result<Vec<Range>, ComparisonError> {
    if ranges.len() < 2 {
        return Ok(ranges);
    }

    let mut sorted = ranges;
    let mut failure = None;
    sorted.sort_by(|a, b| match comparator.compare(&a.lower.value, &b.lower.value) {
        Ok(order) => order.then(b.inclusive_lower.cmp(&a.inclusive_lower)),
        Err(error) => {
            failure.get_or_insert(error);
            Ordering::Equal
        }
    });
    if let Some(error) = failure {
        return Err(error);
    }

    let mut merged: Vec<Range> = Vec::with_capacity(sorted.len());
    for next in sorted {
        if let Some(current) = merged.last_mut() {
            if connects(comparator, current, &next)? {
                extend(comparator, current, next)?;
                continue;
            }
        }
        merged.push(next);
    }
    Ok(merged)
}

/// `current` starts at or before `next`; do they form one interval?
fn connects(
    comparator: &dyn ValueComparator,
    current: &Range,
    next: &Range,
) -> Result<bool, ComparisonError> {
    Ok(match comparator.compare(&current.upper.value, &next.lower.value)? {
        Ordering::Greater => true,
        Ordering::Equal => current.inclusive_upper || next.inclusive_lower,
        Ordering::Less => {
            current.inclusive_upper
                && next.inclusive_lower
                && match comparator.increment(&current.upper.value) {
                    Some(following) => comparator.is_equal(&following, &next.lower.value)?,
                    None => false,
                }
        }
    })
}

fn extend(
    comparator: &dyn ValueComparator,
    current: &mut Range,
    next: Range,
) -> Result<(), ComparisonError> {
    if comparator.is_equal(&current.lower.value, &next.lower.value)? {
        current.inclusive_lower |= next.inclusive_lower;
    }
    match comparator.compare(&next.upper.value, &current.upper.value)? {
        Ordering::Greater => {
            current.upper = next.upper;
            current.inclusive_upper = next.inclusive_upper;
        }
        Ordering::Equal => current.inclusive_upper |= next.inclusive_upper,
        Ordering::Less => {}
    }
    Ok(())
}

/// Drops values equal to an earlier one, keeping first occurrences.
pub(super) fn dedupe(
    comparator: &dyn ValueComparator,
    values: &[SingleValue],
) -> Result<Vec<SingleValue>, ComparisonError> {
    let mut kept: Vec<SingleValue> = Vec::with_capacity(values.len());
    for value in values {
        let mut seen = false;
        for existing in &kept {
            if comparator.is_equal(&existing.value, &value.value)? {
                seen = true;
                break;
            }
        }
        if !seen {
            kept.push(value.clone());
        }
    }
    Ok(kept)
}

/// Drops values covered by one of `ranges`.
pub(super) fn outside(
    comparator: &dyn ValueComparator,
    values: Vec<SingleValue>,
    ranges: &[Range],
) -> Result<Vec<SingleValue>, ComparisonError> {
    let mut kept = Vec::with_capacity(values.len());
    for value in values {
        let mut covered = false;
        for range in ranges {
            if range.contains(comparator, &value.value)? {
                covered = true;
                break;
            }
        }
        if !covered {
            kept.push(value);
        }
    }
    Ok(kept)
}
