use ndarray::ArrayView1;

use crate::error::{ModelErr, Result};

fn check(y_true: &ArrayView1<f64>, y_pred: &ArrayView1<f64>) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(ModelErr::ShapeMismatch {
            what: "predictions",
            got: y_pred.len(),
            expected: y_true.len(),
        });
    }
    if y_true.is_empty() {
        return Err(ModelErr::InvalidInput("cannot score an empty set"));
    }
    Ok(())
}

/// Mean of the squared residuals.
pub fn mean_squared_error(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64> {
    check(&y_true, &y_pred)?;

    let sse: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    Ok(sse / y_true.len() as f64)
}

/// Coefficient of determination.
///
/// A constant `y_true` scores 1.0 when predicted perfectly and 0.0 otherwise.
pub fn r2_score(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64> {
    check(&y_true, &y_pred)?;

    let mean = y_true.mean().unwrap_or_default();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn mse_of_known_residuals() {
        let t = array![1.0, 2.0, 3.0];
        let p = array![1.0, 4.0, 2.0];
        assert_eq!(mean_squared_error(t.view(), p.view()).unwrap(), 5.0 / 3.0);
    }

    #[test]
    fn r2_perfect_and_mean_predictions() {
        let t = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(r2_score(t.view(), t.view()).unwrap(), 1.0);

        let mean = array![2.5, 2.5, 2.5, 2.5];
        assert_eq!(r2_score(t.view(), mean.view()).unwrap(), 0.0);
    }

    #[test]
    fn r2_constant_target() {
        let t = array![3.0, 3.0];
        assert_eq!(r2_score(t.view(), t.view()).unwrap(), 1.0);
        assert_eq!(r2_score(t.view(), array![3.0, 4.0].view()).unwrap(), 0.0);
    }

    #[test]
    fn metrics_reject_mismatched_lengths() {
        let t = array![1.0, 2.0];
        let p = array![1.0];
        assert!(mean_squared_error(t.view(), p.view()).is_err());
        assert!(r2_score(t.view(), p.view()).is_err());
    }
}
