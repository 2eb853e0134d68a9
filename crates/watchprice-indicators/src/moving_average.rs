//! Moving averages used as building blocks by MACD and KDJ.

use std::iter;
use watchprice_core::traits::Indicator;

/// Rolling arithmetic mean over `period` samples.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// A zero period is treated as 1.
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let Some(seed) = data.get(..self.period) else {
            return Vec::new();
        };
        let width = self.period as f64;
        let mut total: f64 = seed.iter().sum();
        let first = total / width;

        let rolled = data.iter().zip(&data[self.period..]).map(move |(leaving, entering)| {
            total += entering - leaving;
            total / width
        });
        iter::once(first).chain(rolled).collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential moving average with `alpha = 2 / (period + 1)`, seeded with
/// the mean of the first `period` samples.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
}

impl Ema {
    /// A zero period is treated as 1.
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
        }
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let Some(seed) = data.get(..self.period) else {
            return Vec::new();
        };
        let start = seed.iter().sum::<f64>() / self.period as f64;
        let alpha = self.alpha;

        let smoothed = data[self.period..].iter().scan(start, move |prev, &value| {
            *prev += alpha * (value - *prev);
            Some(*prev)
        });
        iter::once(start).chain(smoothed).collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(actual: &[f64], expected: &[f64]) -> bool {
        actual.len() == expected.len()
            && actual.iter().zip(expected).all(|(a, e)| (a - e).abs() < 1e-10)
    }

    #[test]
    fn test_sma_rolls() {
        let result = Sma::new(3).calculate(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(close_to(&result, &[2.0, 3.0, 4.0]));
    }

    #[test]
    fn test_sma_short_input() {
        let sma = Sma::new(4);
        assert!(sma.calculate(&[1.0, 2.0, 3.0]).is_empty());
        assert!(sma.latest(&[1.0, 2.0, 3.0]).is_err());
        assert_eq!(sma.latest(&[1.0, 2.0, 3.0, 6.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_ema_seeded_with_mean() {
        // alpha 0.5: 2.0, then halfway towards 4 and 5
        let result = Ema::new(3).calculate(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(close_to(&result, &[2.0, 3.0, 4.0]));
    }

    #[test]
    fn test_zero_period_is_one() {
        assert_eq!(Sma::new(0).period(), 1);
        assert!(close_to(&Ema::new(0).calculate(&[3.0, 7.0]), &[3.0, 7.0]));
    }
}
