//! Geometric level generator.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;

use crate::level_generator::LevelGenerator;

/// Height ceiling used by [`Geometric::default`].
pub const DEFAULT_TOTAL: usize = 32;

/// Probability used by [`Geometric::default`].
pub const DEFAULT_P: f64 = 0.5;

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors that can occur when creating a [`Geometric`] level generator.
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum GeometricError {
    /// The maximum number of levels must be non-zero.
    #[error("max must be non-zero.")]
    ZeroMax,
    /// The probability `$p$` must be in the range `$(0, 1)$`.
    #[error("p must be in (0, 1).")]
    InvalidProbability,
}

/// A level generator using a geometric distribution.
///
/// Every new node starts with a height of 1 and grows by one level for each
/// consecutive successful coin flip, where each flip succeeds with probability
/// `$p \in (0, 1)$`. The height therefore follows a geometric distribution with
/// expectation `$1 / (1 - p)$` (that is, 2 for the default `$p = 0.5$`),
/// truncated at the configured ceiling so that a pathological run of flips
/// cannot grow the map's entry slots without bound.
#[derive(Debug, Clone)]
pub struct Geometric {
    /// The maximum height that will be generated.
    total: usize,
    /// The probability that a node is present in the next level.
    p: f64,
    /// The random number generator.
    rng: SmallRng,
}

impl Geometric {
    /// Create a new geometric level generator producing heights in
    /// `[1, total]`, with `p` as the probability that a given node is present
    /// in the next level.
    ///
    /// The generator is seeded from the thread-local random number generator.
    ///
    /// # Errors
    ///
    /// `p` must be strictly between 0 and 1, and `total` must be greater or
    /// equal to 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::level_generator::{Geometric, GeometricError};
    ///
    /// assert!(Geometric::new(16, 0.25).is_ok());
    /// assert_eq!(Geometric::new(0, 0.5).err(), Some(GeometricError::ZeroMax));
    /// ```
    #[inline]
    pub fn new(total: usize, p: f64) -> Result<Self, GeometricError> {
        Self::with_rng(total, p, SmallRng::from_rng(&mut rand::rng()))
    }

    /// Create a reproducible geometric level generator.
    ///
    /// Two generators built from the same arguments produce the same sequence
    /// of heights.
    ///
    /// # Errors
    ///
    /// As for [`Geometric::new`].
    #[inline]
    pub fn with_seed(total: usize, p: f64, seed: u64) -> Result<Self, GeometricError> {
        Self::with_rng(total, p, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(total: usize, p: f64, rng: SmallRng) -> Result<Self, GeometricError> {
        if total == 0 {
            return Err(GeometricError::ZeroMax);
        }
        if !(0.0 < p && p < 1.0) {
            return Err(GeometricError::InvalidProbability);
        }
        Ok(Geometric { total, p, rng })
    }

    /// The probability that a node is present in the next level.
    #[inline]
    #[must_use]
    pub fn p(&self) -> f64 {
        self.p
    }
}

impl Default for Geometric {
    /// A generator with a ceiling of [`DEFAULT_TOTAL`] levels and
    /// `$p = $` [`DEFAULT_P`].
    #[inline]
    fn default() -> Self {
        Geometric {
            total: DEFAULT_TOTAL,
            p: DEFAULT_P,
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }
}

impl LevelGenerator for Geometric {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    #[inline]
    fn height(&mut self) -> usize {
        let mut h = 1;
        while h < self.total && self.rng.random_bool(self.p) {
            h += 1;
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, bail};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{Geometric, GeometricError, LevelGenerator};

    #[test]
    fn invalid_max() {
        assert_eq!(Geometric::new(0, 0.5).err(), Some(GeometricError::ZeroMax));
        assert_eq!(
            Geometric::new(0, 0.5).unwrap_err().to_string(),
            "max must be non-zero."
        );
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-0.5)]
    #[case(f64::NAN)]
    fn invalid_p(#[case] p: f64) {
        assert_eq!(
            Geometric::new(1, p).err(),
            Some(GeometricError::InvalidProbability)
        );
        assert_eq!(
            Geometric::with_seed(1, p, 0).err(),
            Some(GeometricError::InvalidProbability)
        );
    }

    #[rstest]
    fn new(
        #[values(1, 2, 16, 128)] n: usize,
        #[values(0.01, 0.1, 0.5, 0.9)] p: f64,
    ) -> Result<()> {
        let mut generator = Geometric::new(n, p)?;
        assert_eq!(generator.total(), n);
        for _ in 0..100_000 {
            let height = generator.height();
            assert!((1..=n).contains(&height));
        }

        // Every node reaches level 0, so height 1 must show up quickly.
        let mut found = false;
        for _ in 0..100_000 {
            if generator.height() == 1 {
                found = true;
                break;
            }
        }
        if !found {
            bail!("Failed to generate a height-1 node.");
        }

        Ok(())
    }

    #[test]
    fn reaches_ceiling() -> Result<()> {
        let mut generator = Geometric::with_seed(4, 0.5, 7)?;
        if !(0..100_000).any(|_| generator.height() == 4) {
            bail!("Failed to generate a height-4 node.");
        }
        Ok(())
    }

    #[test]
    fn mean_height() -> Result<()> {
        let mut generator = Geometric::with_seed(64, 0.5, 0x1234_abcd)?;
        let samples = 200_000;
        let total: usize = (0..samples).map(|_| generator.height()).sum();
        #[expect(clippy::cast_precision_loss, reason = "Sample sizes are small")]
        let mean = total as f64 / f64::from(samples);
        assert!((mean - 2.0).abs() < 0.05, "mean height was {mean}");
        Ok(())
    }

    #[test]
    fn seeded_is_reproducible() -> Result<()> {
        let mut a = Geometric::with_seed(32, 0.5, 42)?;
        let mut b = Geometric::with_seed(32, 0.5, 42)?;
        let a: Vec<_> = (0..1_000).map(|_| a.height()).collect();
        let b: Vec<_> = (0..1_000).map(|_| b.height()).collect();
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn default() {
        let generator = Geometric::default();
        assert_eq!(generator.total(), 32);
        assert!((generator.p() - 0.5).abs() < f64::EPSILON);
    }
}
