//! Linear algebra utilities.
//!
//! Closed-form 2x2 solve used by the energy-distribution scaling.

use eltrace_types::error::{SimError, SimResult};

/// Determinants below this magnitude are treated as singular.
pub const SINGULAR_DET: f64 = 1e-12;

/// Determinant of a 2x2 matrix.
#[inline]
pub fn det_2x2(a: &[[f64; 2]; 2]) -> f64 {
    a[0][0] * a[1][1] - a[0][1] * a[1][0]
}

/// Solve `A x = b` for a 2x2 system by Cramer's rule.
pub fn solve_2x2(a: &[[f64; 2]; 2], b: &[f64; 2]) -> SimResult<[f64; 2]> {
    let det = det_2x2(a);
    if !det.is_finite() || det.abs() < SINGULAR_DET {
        return Err(SimError::SingularSystem(format!(
            "2x2 determinant {det:e} is below {SINGULAR_DET:e}"
        )));
    }
    let x0 = (b[0] * a[1][1] - a[0][1] * b[1]) / det;
    let x1 = (a[0][0] * b[1] - b[0] * a[1][0]) / det;
    Ok([x0, x1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_2x2_identity() {
        let x = solve_2x2(&[[1.0, 0.0], [0.0, 1.0]], &[3.0, -4.0]).unwrap();
        assert_eq!(x, [3.0, -4.0]);
    }

    #[test]
    fn test_solve_2x2_general() {
        // 2x + y = 5, x - 3y = -1  →  x = 2, y = 1
        let x = solve_2x2(&[[2.0, 1.0], [1.0, -3.0]], &[5.0, -1.0]).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-12);
        assert!((x[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_2x2_singular() {
        let err = solve_2x2(&[[1.0, 2.0], [2.0, 4.0]], &[1.0, 2.0]).unwrap_err();
        match err {
            SimError::SingularSystem(msg) => assert!(msg.contains("determinant")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_solve_2x2_near_singular_threshold() {
        let err = solve_2x2(&[[1e-7, 0.0], [0.0, 1e-6]], &[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, SimError::SingularSystem(_)));
        let ok = solve_2x2(&[[1e-5, 0.0], [0.0, 1e-6]], &[1.0, 1.0]).unwrap();
        assert!((ok[0] - 1e5).abs() < 1e-6);
    }
}
