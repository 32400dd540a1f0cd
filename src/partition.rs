// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Random Partition
//
// Stick-breaking split: cut [0, total] at count-1 uniform points and hand
// out the segment lengths. Parts telescope back to the total, and any single
// part may be arbitrarily small.

use rand::Rng;

/// Split `total` into `count` non-negative parts that sum to `total`.
///
/// `count == 0` yields an empty vector. A non-positive or non-finite total
/// yields zeros.
pub fn random_partition<R: Rng + ?Sized>(rng: &mut R, total: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if !total.is_finite() || total <= 0.0 {
        return vec![0.0; count];
    }
    if count == 1 {
        return vec![total];
    }

    let mut cuts = Vec::with_capacity(count + 1);
    cuts.push(0.0);
    for _ in 0..count - 1 {
        cuts.push(rng.gen_range(0.0..=total));
    }
    cuts.push(total);
    cuts.sort_by(f64::total_cmp);

    cuts.windows(2).map(|w| w[1] - w[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn assert_sums_to(parts: &[f64], total: f64) {
        let sum: f64 = parts.iter().sum();
        let tolerance = 1e-9 * total.abs().max(1.0);
        assert!((sum - total).abs() <= tolerance, "sum {} != total {}", sum, total);
    }

    #[test]
    fn test_single_part_is_total() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(random_partition(&mut rng, 1234.5, 1), vec![1234.5]);
    }

    #[test]
    fn test_zero_total_gives_zeros() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(random_partition(&mut rng, 0.0, 4), vec![0.0; 4]);
    }

    #[test]
    fn test_zero_count_is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(random_partition(&mut rng, 10.0, 0).is_empty());
    }

    #[test]
    fn test_negative_total_treated_as_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(random_partition(&mut rng, -5.0, 2), vec![0.0, 0.0]);
        assert_eq!(random_partition(&mut rng, f64::NAN, 2), vec![0.0, 0.0]);
    }

    #[test]
    fn test_parts_sum_and_are_non_negative() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for count in 1..=12 {
            for &total in &[0.001, 1.0, 5_000.0, 6_027_770.369_409_686, 1e9] {
                let parts = random_partition(&mut rng, total, count);
                assert_eq!(parts.len(), count);
                assert!(parts.iter().all(|&p| p >= 0.0));
                assert_sums_to(&parts, total);
            }
        }
    }

    #[test]
    fn test_parts_are_not_all_equal() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let parts = random_partition(&mut rng, 100.0, 5);
        assert!(parts.iter().any(|&p| (p - 20.0).abs() > 1e-6));
    }

    #[test]
    fn test_mean_share_is_total_over_count() {
        // Stick-breaking parts are exchangeable, so each has mean total/count.
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let n = 20_000;
        let mut first = 0.0;
        for _ in 0..n {
            first += random_partition(&mut rng, 90.0, 3)[0];
        }
        let mean = first / n as f64;
        assert!((mean - 30.0).abs() < 1.0, "mean first share {}", mean);
    }
}
