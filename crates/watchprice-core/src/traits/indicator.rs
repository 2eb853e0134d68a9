//! Indicator trait definitions.
//!
//! Every indicator computes its whole output series, oldest first; `latest`
//! picks the reading the quote pipeline attaches.

use crate::error::IndicatorError;

/// Fails when fewer than `required` samples are available.
pub fn require_samples(required: usize, available: usize) -> Result<(), IndicatorError> {
    if available < required {
        return Err(IndicatorError::InsufficientData {
            required,
            available,
        });
    }
    Ok(())
}

fn last_or_empty<T>(mut series: Vec<T>, name: &str) -> Result<T, IndicatorError> {
    series
        .pop()
        .ok_or_else(|| IndicatorError::CalculationError(format!("{name} produced no value")))
}

/// Indicator over one series, typically closes.
pub trait Indicator: Send + Sync {
    type Output;

    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Samples needed for the first output.
    fn period(&self) -> usize;

    fn name(&self) -> &str;

    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        require_samples(self.period(), data.len())
    }

    /// Most recent value, or an error when the series is too short.
    fn latest(&self, data: &[f64]) -> Result<Self::Output, IndicatorError> {
        self.validate_data(data)?;
        last_or_empty(self.calculate(data), self.name())
    }
}

/// Indicator producing several related lines per sample (MACD).
pub trait MultiOutputIndicator: Send + Sync {
    type Outputs;

    fn calculate(&self, data: &[f64]) -> Vec<Self::Outputs>;

    /// Samples needed for the first output.
    fn period(&self) -> usize;

    fn name(&self) -> &str;

    /// Most recent output, or an error when the series is too short.
    fn latest(&self, data: &[f64]) -> Result<Self::Outputs, IndicatorError> {
        require_samples(self.period(), data.len())?;
        last_or_empty(self.calculate(data), self.name())
    }
}

/// Indicator over aligned high/low/close columns (KDJ).
pub trait HlcIndicator: Send + Sync {
    type Output;

    fn calculate(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<Self::Output>;

    /// Bars needed for the first output.
    fn period(&self) -> usize;

    fn name(&self) -> &str;

    /// Most recent value, or an error when the columns are too short or misaligned.
    fn latest(&self, high: &[f64], low: &[f64], close: &[f64]) -> Result<Self::Output, IndicatorError> {
        if high.len() != close.len() || low.len() != close.len() {
            return Err(IndicatorError::InvalidParameter(format!(
                "{}: column lengths differ ({}, {}, {})",
                self.name(),
                high.len(),
                low.len(),
                close.len()
            )));
        }
        require_samples(self.period(), close.len())?;
        last_or_empty(self.calculate(high, low, close), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestIndicator {
        period: usize,
    }

    impl Indicator for TestIndicator {
        type Output = f64;

        fn calculate(&self, data: &[f64]) -> Vec<f64> {
            data.windows(self.period)
                .map(|w| w.iter().sum())
                .collect()
        }

        fn period(&self) -> usize {
            self.period
        }

        fn name(&self) -> &str {
            "test"
        }
    }

    struct RangeIndicator;

    impl HlcIndicator for RangeIndicator {
        type Output = f64;

        fn calculate(&self, high: &[f64], low: &[f64], _close: &[f64]) -> Vec<f64> {
            high.iter().zip(low).map(|(h, l)| h - l).collect()
        }

        fn period(&self) -> usize {
            1
        }

        fn name(&self) -> &str {
            "range"
        }
    }

    #[test]
    fn test_indicator_validation() {
        let indicator = TestIndicator { period: 5 };

        assert!(indicator.validate_data(&[1.0, 2.0, 3.0]).is_err());
        assert!(indicator.validate_data(&[1.0, 2.0, 3.0, 4.0, 5.0]).is_ok());
    }

    #[test]
    fn test_indicator_latest() {
        let indicator = TestIndicator { period: 3 };
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        assert!((indicator.latest(&data).unwrap() - 12.0).abs() < 0.001); // 3+4+5
        assert_eq!(
            indicator.latest(&data[..2]),
            Err(IndicatorError::InsufficientData {
                required: 3,
                available: 2
            })
        );
    }

    #[test]
    fn test_hlc_latest_rejects_misaligned_columns() {
        let result = RangeIndicator.latest(&[2.0, 3.0], &[1.0], &[1.5, 2.5]);
        assert!(matches!(result, Err(IndicatorError::InvalidParameter(_))));

        let latest = RangeIndicator.latest(&[2.0, 3.5], &[1.0, 1.5], &[1.5, 2.5]).unwrap();
        assert!((latest - 2.0).abs() < 1e-10);
    }
}
