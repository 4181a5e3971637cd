// Descriptive statistics over numeric columns

/// count / mean / std / min / quartiles / max of one column
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; undefined for fewer than two values
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Summarize `values`; `None` when there are no values
pub fn describe(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        Some((ss / (count - 1) as f64).sqrt())
    } else {
        None
    };

    Some(Summary {
        count,
        mean,
        std,
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Linear-interpolated quantile of an ascending slice; NaN when empty
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;

    if lower_idx == upper_idx {
        sorted[lower_idx]
    } else {
        let weight = rank - lower_idx as f64;
        sorted[lower_idx] * (1.0 - weight) + sorted[upper_idx] * weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_describe_empty() {
        assert!(describe(&[]).is_none());
    }

    #[test]
    fn test_describe_single() {
        let s = describe(&[4.0]).unwrap();
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, 4.0);
        assert_eq!(s.std, None);
        assert_eq!((s.min, s.q1, s.median, s.q3, s.max), (4.0, 4.0, 4.0, 4.0, 4.0));
    }

    #[test]
    fn test_describe_sample_quantities() {
        // Quantity column of the built-in dataset
        let s = describe(&[2.0, 1.0, 3.0, 1.0, 2.0, 1.0, 4.0, 3.0, 2.0, 1.0]).unwrap();
        assert_eq!(s.count, 10);
        assert!(approx(s.mean, 2.0));
        assert!(approx(s.std.unwrap(), (10.0f64 / 9.0).sqrt()));
        assert_eq!(s.min, 1.0);
        assert!(approx(s.q1, 1.0));
        assert!(approx(s.median, 2.0));
        assert!(approx(s.q3, 2.75));
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!(approx(quantile(&sorted, 0.5), 2.5));
        assert!(approx(quantile(&sorted, 0.25), 1.75));
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
    }

    #[test]
    fn test_quantile_edge_cases() {
        assert!(quantile(&[], 0.5).is_nan());
        assert_eq!(quantile(&[7.0], 0.9), 7.0);
        // Exact ranks return the stored value untouched
        assert_eq!(quantile(&[1.0, 2.0, 3.0], 0.5), 2.0);
    }

    #[test]
    fn test_describe_is_order_independent() {
        let a = describe(&[5.0, 1.0, 3.0]).unwrap();
        let b = describe(&[3.0, 5.0, 1.0]).unwrap();
        assert_eq!(a, b);
    }
}
