//! Kepler equation solver and anomaly conversions.

use std::f64::consts::{PI, TAU};

/// Newton–Raphson iteration cap before falling back to bisection.
pub const MAX_NEWTON_ITERATIONS: usize = 10;

/// Convergence threshold on the Newton step |ΔE|.
pub const NEWTON_TOLERANCE: f64 = 1e-6;

/// Bisection iterations used when Newton does not converge in time.
/// 60 halvings of [0, π] reach below 1e-17 rad.
const BISECTION_ITERATIONS: usize = 60;

/// Solve Kepler's equation M = E - e*sin(E) for eccentric anomaly E
/// using Newton's method.
///
/// # Arguments
/// * `mean_anomaly` - Mean anomaly M in radians (any value, reduced mod 2π)
/// * `eccentricity` - Orbital eccentricity, 0 ≤ e < 1
///
/// # Returns
/// Eccentric anomaly E in radians, in [0, 2π)
///
/// # Robustness
/// The second half of the orbit is mirrored onto M ∈ [0, π], where the root
/// is bracketed by [0, π]. Newton runs for at most
/// [`MAX_NEWTON_ITERATIONS`]; if it has not converged (very high
/// eccentricity near periapsis) the bracket is bisected instead, so the
/// result always satisfies the equation.
pub fn solve_eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let m = mean_anomaly.rem_euclid(TAU);
    let e = eccentricity;

    // E(2π - M) = 2π - E(M)
    let (m_half, mirrored) = if m > PI { (TAU - m, true) } else { (m, false) };

    let e_anomaly = newton(m_half, e).unwrap_or_else(|| bisect(m_half, e));

    if mirrored { TAU - e_anomaly } else { e_anomaly }
}

/// Newton iteration on [0, π]. Returns `None` if the step size never drops
/// below [`NEWTON_TOLERANCE`].
fn newton(m: f64, e: f64) -> Option<f64> {
    // Starting at π converges monotonically for high eccentricity
    // (f is convex on [0, π]); M + e*sin(M) is closer for near-circular orbits.
    let mut e_anomaly = if e < 0.8 { m + e * m.sin() } else { PI };

    for _ in 0..MAX_NEWTON_ITERATIONS {
        // f(E) = E - e*sin(E) - M
        let f = e_anomaly - e * e_anomaly.sin() - m;
        // f'(E) = 1 - e*cos(E)
        let f_prime = 1.0 - e * e_anomaly.cos();

        let delta = f / f_prime;
        e_anomaly = (e_anomaly - delta).clamp(0.0, PI);

        if delta.abs() < NEWTON_TOLERANCE {
            return Some(e_anomaly);
        }
    }

    None
}

/// Bisection fallback on the bracket [0, π].
fn bisect(m: f64, e: f64) -> f64 {
    let mut lo = 0.0;
    let mut hi = PI;

    for _ in 0..BISECTION_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if mid - e * mid.sin() - m > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    0.5 * (lo + hi)
}

/// Compute true anomaly from eccentric anomaly.
///
/// Uses atan2 for full quadrant coverage (atan only returns [-π/2, π/2]):
/// ν = 2 * atan2(sqrt(1+e) * sin(E/2), sqrt(1-e) * cos(E/2))
pub fn eccentric_to_true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let e = eccentricity;
    let half_e = eccentric_anomaly / 2.0;

    let y = (1.0 + e).sqrt() * half_e.sin();
    let x = (1.0 - e).sqrt() * half_e.cos();
    2.0 * y.atan2(x)
}

/// Compute eccentric anomaly from true anomaly.
///
/// E = 2 * atan2(sqrt(1-e) * sin(ν/2), sqrt(1+e) * cos(ν/2))
pub fn true_to_eccentric_anomaly(true_anomaly: f64, eccentricity: f64) -> f64 {
    let e = eccentricity;
    let half_nu = true_anomaly / 2.0;

    let y = (1.0 - e).sqrt() * half_nu.sin();
    let x = (1.0 + e).sqrt() * half_nu.cos();
    2.0 * y.atan2(x)
}

/// Mean anomaly from eccentric anomaly (Kepler's equation, forward direction).
pub fn eccentric_to_mean_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_anomaly - eccentricity * eccentric_anomaly.sin()
}
