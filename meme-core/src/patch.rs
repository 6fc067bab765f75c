//! Shallow-diff-then-merge updates.
//!
//! Every entity that can be partially updated has an update struct whose
//! fields are all `Option`. Applying it copies only the fields that are
//! present *and* differ from the current value, so callers can tell a real
//! change from a redundant one (e.g. a drag that reports unchanged
//! coordinates) and skip the history entry.

/// A partial update that can be merged into a `T`.
pub trait Patch<T> {
    /// Merge the present, differing fields into `target`.
    ///
    /// Returns `true` if at least one field changed.
    fn apply_to(&self, target: &mut T) -> bool;

    /// Returns `true` if applying this patch would change `target`.
    fn changes(&self, target: &T) -> bool
    where
        T: Clone,
    {
        let mut probe = target.clone();
        self.apply_to(&mut probe)
    }
}

/// Overwrite `slot` with `update` when it is present and differs.
///
/// Returns `true` if the slot was written.
pub fn merge_field<V>(slot: &mut V, update: Option<&V>) -> bool
where
    V: PartialEq + Clone,
{
    match update {
        Some(value) if slot != value => {
            *slot = value.clone();
            true
        }
        _ => false,
    }
}

/// Like [`merge_field`] for geometry, but ignores NaN and infinite values.
///
/// A NaN never compares equal to itself, so it would otherwise count as a
/// change on every update.
pub fn merge_finite(slot: &mut f32, update: Option<&f32>) -> bool {
    merge_field(slot, update.filter(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: f32,
        label: Option<String>,
    }

    struct PointUpdate {
        x: Option<f32>,
        label: Option<Option<String>>,
    }

    impl Patch<Point> for PointUpdate {
        fn apply_to(&self, target: &mut Point) -> bool {
            let mut changed = merge_field(&mut target.x, self.x.as_ref());
            changed |= merge_field(&mut target.label, self.label.as_ref());
            changed
        }
    }

    #[test]
    fn test_merge_field_skips_equal_values() {
        let mut x = 3.0_f32;
        assert!(!merge_field(&mut x, Some(&3.0)));
        assert!(!merge_field(&mut x, None));
        assert!(merge_field(&mut x, Some(&4.0)));
        assert!((x - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_merge_finite_ignores_nan_and_infinity() {
        let mut x = 3.0_f32;
        assert!(!merge_finite(&mut x, Some(&f32::NAN)));
        assert!(!merge_finite(&mut x, Some(&f32::INFINITY)));
        assert!((x - 3.0).abs() < f32::EPSILON);
        assert!(merge_finite(&mut x, Some(&5.0)));
        assert!((x - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_patch_reports_change() {
        let mut point = Point {
            x: 1.0,
            label: Some("a".to_string()),
        };
        let same = PointUpdate {
            x: Some(1.0),
            label: None,
        };
        assert!(!same.changes(&point));
        assert!(!same.apply_to(&mut point));

        let clear = PointUpdate {
            x: None,
            label: Some(None),
        };
        assert!(clear.apply_to(&mut point));
        assert_eq!(point.label, None);
    }
}
