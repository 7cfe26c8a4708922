//! Integer space distribution shared by flex growth and grid tracks.

use smallvec::SmallVec;

/// Splits `total` cells between `weights` proportionally.
///
/// Every share is floored first; the cells lost to flooring are then handed
/// out one at a time by largest fractional part, ties going to the earlier
/// entry. The shares always sum to `total` when any weight is positive, and
/// are all zero otherwise.
pub fn distribute(total: i32, weights: &[f64]) -> Vec<i32> {
    let mut shares = vec![0; weights.len()];
    let weight_sum: f64 = weights.iter().copied().filter(|w| *w > 0.0).sum();
    if total <= 0 || weight_sum <= 0.0 || !weight_sum.is_finite() {
        return shares;
    }

    let mut fractions: SmallVec<[(usize, f64); 8]> = SmallVec::new();
    let mut assigned: i64 = 0;
    for (index, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        let exact = f64::from(total) * weight / weight_sum;
        let floor = exact.floor();
        shares[index] = floor as i32;
        assigned += floor as i64;
        fractions.push((index, exact - floor));
    }

    // Largest remainder first; the sort is stable so ties keep source order.
    fractions.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut leftover = i64::from(total) - assigned;
    for &(index, _) in fractions.iter().cycle() {
        if leftover <= 0 {
            break;
        }
        shares[index] += 1;
        leftover -= 1;
    }
    shares
}

/// Converts a gap-like value to whole cells.
///
/// Fractional values are floored and negative values clamp to zero. Returns
/// `None` for NaN or infinities so callers can report the offending prop.
pub fn floor_cells(value: f64) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    Some(value.floor().clamp(0.0, f64::from(i32::MAX)) as i32)
}
