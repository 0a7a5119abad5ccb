//! Plain-f64 statistics helpers shared by anomaly detection and charts.

use serde::{Deserialize, Serialize};

/// Five-number summary plus Tukey fences, as a chart payload fragment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
    pub mean: f64,
    pub count: usize,
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Ordinary least squares fit of y against x.
#[derive(Debug, Clone, Copy)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub residual_std: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Quantile with linear interpolation over an ascending-sorted slice.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * p;
    let base = pos.floor() as usize;
    let rest = pos - base as f64;
    match sorted.get(base + 1) {
        Some(next) => Some(sorted[base] + rest * (next - sorted[base])),
        None => Some(sorted[base]),
    }
}

/// Box-and-whisker stats over raw values; non-finite entries are ignored.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let sorted = sorted_finite(values);
    if sorted.is_empty() {
        return None;
    }
    let q1 = quantile(&sorted, 0.25)?;
    let median = quantile(&sorted, 0.5)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    Some(BoxStats {
        q1,
        median,
        q3,
        iqr,
        lower: q1 - 1.5 * iqr,
        upper: q3 + 1.5 * iqr,
        mean: mean(&sorted),
        count: sorted.len(),
    })
}

/// Descriptive statistics over raw values; non-finite entries are ignored.
pub fn describe(values: &[f64]) -> Option<Describe> {
    let sorted = sorted_finite(values);
    if sorted.is_empty() {
        return None;
    }
    let mean_value = mean(&sorted);
    let variance = sorted
        .iter()
        .map(|v| {
            let centered = v - mean_value;
            centered * centered
        })
        .sum::<f64>()
        / sorted.len() as f64;
    Some(Describe {
        count: sorted.len(),
        mean: mean_value,
        std: variance.sqrt(),
        min: sorted[0],
        q1: quantile(&sorted, 0.25)?,
        median: quantile(&sorted, 0.5)?,
        q3: quantile(&sorted, 0.75)?,
        max: *sorted.last()?,
    })
}

/// Pearson correlation over paired samples.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= 1e-12 || var_y <= 1e-12 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Least-squares line through paired samples, with residual spread.
pub fn ols(pairs: &[(f64, f64)]) -> Option<LinearFit> {
    if pairs.len() < 3 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    for (x, y) in pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x) * (x - mean_x);
    }
    if var_x <= 1e-12 {
        return None;
    }
    let slope = cov / var_x;
    let intercept = mean_y - slope * mean_x;
    let residual_var = pairs
        .iter()
        .map(|(x, y)| {
            let r = y - (slope * x + intercept);
            r * r
        })
        .sum::<f64>()
        / n;
    Some(LinearFit {
        slope,
        intercept,
        residual_std: residual_var.sqrt(),
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut clean: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    clean.sort_by(|a, b| a.total_cmp(b));
    clean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn box_stats_match_reference() {
        let stats = box_stats(&[2.0, 4.0, 4.0, 5.0, 9.0]).unwrap();
        assert_eq!(stats.median, 4.0);
        assert_eq!(stats.count, 5);
        assert!(stats.lower < stats.q1);
        assert!(stats.upper > stats.q3);
        assert!((stats.mean - 4.8).abs() < 1e-9);
    }

    #[test]
    fn describe_ignores_non_finite() {
        let d = describe(&[1.0, f64::NAN, 3.0, f64::INFINITY]).unwrap();
        assert_eq!(d.count, 2);
        assert_eq!(d.min, 1.0);
        assert_eq!(d.max, 3.0);
        assert_eq!(d.mean, 2.0);
    }

    #[test]
    fn pearson_detects_perfect_correlation() {
        let pairs: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        let r = pearson(&pairs).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ols_recovers_line() {
        let pairs: Vec<(f64, f64)> = (0..20).map(|i| (i as f64, 3.0 * i as f64 - 2.0)).collect();
        let fit = ols(&pairs).unwrap();
        assert!((fit.slope - 3.0).abs() < 1e-9);
        assert!((fit.intercept + 2.0).abs() < 1e-9);
        assert!(fit.residual_std < 1e-9);
    }

    #[test]
    fn degenerate_inputs_yield_none() {
        assert!(pearson(&[(1.0, 2.0)]).is_none());
        assert!(pearson(&[(1.0, 2.0), (1.0, 3.0)]).is_none());
        assert!(ols(&[(1.0, 2.0), (2.0, 3.0)]).is_none());
        assert!(box_stats(&[f64::NAN]).is_none());
    }
}
