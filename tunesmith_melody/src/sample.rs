// Weighted sampling from outcome tables.
//
// Standard cumulative-distribution sampling over a `BTreeMap`, so entries
// are always walked in ascending key order (ascending pitch for note
// names). The order only decides which entry wins at an exact boundary, not
// the overall distribution.
//
// Weights that are negative, NaN, or infinite count as zero. The first entry
// whose running sum reaches the target wins, so a zero-weight entry ahead of
// every positive one is returned for a draw of exactly 0. When every weight
// is zero the last entry is returned without consuming randomness.

use std::collections::BTreeMap;

use tunesmith_prng::MelodyRng;

/// Draw one key with probability proportional to its weight.
///
/// Returns `None` only for an empty table.
pub fn weighted_pick<'a, K>(table: &'a BTreeMap<K, f64>, rng: &mut MelodyRng) -> Option<&'a K> {
    if total_weight(table) <= 0.0 {
        return table.keys().next_back();
    }
    pick_at(table, rng.next_f64())
}

/// Select the key whose cumulative weight first reaches `unit * total`.
///
/// `unit` is a draw in [0, 1); values outside are clamped. This is the
/// deterministic core of `weighted_pick`.
pub fn pick_at<K>(table: &BTreeMap<K, f64>, unit: f64) -> Option<&K> {
    let total = total_weight(table);
    if total <= 0.0 {
        return table.keys().next_back();
    }

    let target = unit.clamp(0.0, 1.0) * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (key, &weight) in table {
        let weight = effective_weight(weight);
        cumulative += weight;
        if weight > 0.0 {
            last_positive = Some(key);
        }
        if cumulative >= target {
            return Some(key);
        }
    }
    // Rounding can leave the running sum a hair below target.
    last_positive
}

/// Sum of effective weights.
pub fn total_weight<K>(table: &BTreeMap<K, f64>) -> f64 {
    table.values().copied().map(effective_weight).sum()
}

fn effective_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&'static str, f64)]) -> BTreeMap<&'static str, f64> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_empty_table() {
        let t: BTreeMap<&str, f64> = BTreeMap::new();
        let mut rng = MelodyRng::new(1);
        assert!(weighted_pick(&t, &mut rng).is_none());
        assert!(pick_at(&t, 0.5).is_none());
    }

    #[test]
    fn test_all_zero_returns_last_entry() {
        let t = table(&[("a", 0.0), ("b", 0.0), ("c", 0.0)]);
        let mut rng = MelodyRng::new(1);
        for _ in 0..10 {
            assert_eq!(weighted_pick(&t, &mut rng), Some(&"c"));
        }
    }

    #[test]
    fn test_zero_total_consumes_no_randomness() {
        let t = table(&[("a", 0.0)]);
        let mut rng = MelodyRng::new(9);
        let mut untouched = MelodyRng::new(9);
        weighted_pick(&t, &mut rng);
        assert_eq!(rng.next_u64(), untouched.next_u64());
    }

    #[test]
    fn test_boundaries_walk_in_key_order() {
        let t = table(&[("a", 1.0), ("b", 1.0), ("c", 2.0)]);
        assert_eq!(pick_at(&t, 0.0), Some(&"a"));
        assert_eq!(pick_at(&t, 0.25), Some(&"a"));
        assert_eq!(pick_at(&t, 0.26), Some(&"b"));
        assert_eq!(pick_at(&t, 0.5), Some(&"b"));
        assert_eq!(pick_at(&t, 0.51), Some(&"c"));
        assert_eq!(pick_at(&t, 0.999_999), Some(&"c"));
    }

    #[test]
    fn test_zero_draw_takes_first_entry_reaching_target() {
        let t = table(&[("a", 0.0), ("b", 1.0), ("c", 0.0)]);
        assert_eq!(pick_at(&t, 0.0), Some(&"a"));
        assert_eq!(pick_at(&t, 1e-12), Some(&"b"));
        assert_eq!(pick_at(&t, 0.999), Some(&"b"));
    }

    #[test]
    fn test_trailing_zero_weight_never_drawn() {
        let t = table(&[("a", 1.0), ("b", 0.0)]);
        assert_eq!(pick_at(&t, 1.0), Some(&"a"));
        let mut rng = MelodyRng::new(11);
        for _ in 0..1000 {
            assert_eq!(weighted_pick(&t, &mut rng), Some(&"a"));
        }
    }

    #[test]
    fn test_bad_weights_count_as_zero() {
        let t = table(&[("a", f64::NAN), ("b", -3.0), ("c", f64::INFINITY), ("d", 2.0)]);
        let mut rng = MelodyRng::new(5);
        for _ in 0..100 {
            assert_eq!(weighted_pick(&t, &mut rng), Some(&"d"));
        }
    }

    #[test]
    fn test_even_weights_split_evenly() {
        let t = table(&[("a", 2.0), ("b", 2.0)]);
        let mut rng = MelodyRng::new(42);
        let draws = 10_000;
        let mut a_count = 0;
        for _ in 0..draws {
            if weighted_pick(&t, &mut rng) == Some(&"a") {
                a_count += 1;
            }
        }
        let share = f64::from(a_count) / f64::from(draws);
        assert!(
            (0.4..0.6).contains(&share),
            "expected ~50% 'a', got {:.1}%",
            share * 100.0
        );
    }

    #[test]
    fn test_skewed_weights() {
        let t = table(&[("rare", 1.0), ("common", 9.0)]);
        let mut rng = MelodyRng::new(7);
        let draws = 10_000;
        let rare = (0..draws)
            .filter(|_| weighted_pick(&t, &mut rng) == Some(&"rare"))
            .count();
        let share = rare as f64 / draws as f64;
        assert!((0.07..0.13).contains(&share), "rare share {share}");
    }
}
