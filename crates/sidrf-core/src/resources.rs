//! Resource vector arithmetic
//!
//! Capacities, demands, and allocations are plain `f64` slices indexed by
//! resource dimension. Callers are responsible for passing slices of equal
//! length; the workload parser enforces this for every task.

/// Whether `demand` can be added on top of `consumed` without exceeding
/// `capacity` in any dimension
pub fn fits(demand: &[f64], consumed: &[f64], capacity: &[f64]) -> bool {
    demand
        .iter()
        .zip(consumed)
        .zip(capacity)
        .all(|((d, c), cap)| d + c <= *cap)
}

/// Whether every dimension still has some idle capacity
pub fn has_headroom(consumed: &[f64], capacity: &[f64]) -> bool {
    consumed.iter().zip(capacity).all(|(c, cap)| c < cap)
}

pub fn add_assign(target: &mut [f64], amount: &[f64]) {
    for (t, a) in target.iter_mut().zip(amount) {
        *t += a;
    }
}

pub fn sub_assign(target: &mut [f64], amount: &[f64]) {
    for (t, a) in target.iter_mut().zip(amount) {
        *t -= a;
    }
}

/// Largest normalized allocation across dimensions (0 for empty vectors)
pub fn max_ratio(alloc: &[f64], capacity: &[f64]) -> f64 {
    alloc
        .iter()
        .zip(capacity)
        .map(|(a, cap)| a / cap)
        .fold(0.0, f64::max)
}
