//! Short-term trend deviation.

use watchprice_core::error::IndicatorError;
use watchprice_core::traits::Indicator;

/// Percent deviation of each close from the mean of the trailing `period`
/// closes (the close itself included), rounded to 2 dp.
#[derive(Debug, Clone)]
pub struct TrendDeviation {
    period: usize,
}

impl TrendDeviation {
    pub const DEFAULT_PERIOD: usize = 5;

    /// A zero period is treated as 1.
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    fn deviation(window: &[f64]) -> Option<f64> {
        let last = *window.last()?;
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        if mean == 0.0 || !mean.is_finite() {
            return None;
        }
        Some(((last - mean) / mean * 100.0 * 100.0).round() / 100.0)
    }
}

impl Default for TrendDeviation {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}

impl Indicator for TrendDeviation {
    type Output = f64;

    /// Windows with a zero mean yield NaN.
    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        data.windows(self.period)
            .map(|w| Self::deviation(w).unwrap_or(f64::NAN))
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Trend"
    }

    fn latest(&self, data: &[f64]) -> Result<f64, IndicatorError> {
        self.validate_data(data)?;
        Self::deviation(&data[data.len() - self.period..]).ok_or_else(|| {
            IndicatorError::CalculationError("trend mean is zero".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_deviation() {
        let trend = TrendDeviation::default();
        // mean = 10.4, latest 12 => 15.38%
        let data = vec![50.0, 10.0, 10.0, 10.0, 10.0, 12.0];
        assert_eq!(trend.latest(&data).unwrap(), 15.38);
        assert_eq!(trend.calculate(&data).len(), 2);
    }

    #[test]
    fn test_trend_flat_series() {
        let trend = TrendDeviation::new(3);
        assert_eq!(trend.latest(&[7.0, 7.0, 7.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_trend_zero_mean_is_error() {
        let trend = TrendDeviation::new(2);
        assert!(matches!(
            trend.latest(&[0.0, 0.0]),
            Err(IndicatorError::CalculationError(_))
        ));
        assert!(trend.calculate(&[0.0, 0.0])[0].is_nan());
    }
}
