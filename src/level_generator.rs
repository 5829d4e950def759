//! Skiplists use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 0) contains all the nodes, and each
//! level $n > 0$ will contain a random subset of the nodes on level `n - 1`.
//!
//! Most commonly, a geometric distribution is used whereby the chance that a
//! node occupies level $n$ is $p$ times the chance of occupying level $n-1$
//! (with $0 < p < 1$). The height drawn for a node is the sole source of
//! balance in the map: there is no rotation or rebalancing step anywhere.
//!
//! It is very unlikely that this will need to be changed as the default should
//! suffice, but if need be custom level generators can be implemented.

pub mod geometric;

pub use geometric::{Geometric, GeometricError};

// ////////////////////////////////////////////////////////////////////////////
// Level Generator
// ////////////////////////////////////////////////////////////////////////////

/// Upon the insertion of a new node in the map, the node is replicated to
/// higher levels with a certain probability as determined by a
/// [`LevelGenerator`].
pub trait LevelGenerator {
    /// The maximum height a node may be given.
    ///
    /// This bounds the number of entry slots the map will ever allocate.
    #[must_use]
    fn total(&self) -> usize;

    /// Generate the height of a new node in the range `[1, total]`.
    ///
    /// This function should _never_ return zero, nor a height greater than
    /// [`total`][LevelGenerator::total].
    #[must_use]
    fn height(&mut self) -> usize;
}

impl<G: LevelGenerator + ?Sized> LevelGenerator for Box<G> {
    #[inline]
    fn total(&self) -> usize {
        (**self).total()
    }

    #[inline]
    fn height(&mut self) -> usize {
        (**self).height()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Geometric, LevelGenerator};

    /// Always returns the same height, handy to force a shape on the map.
    struct Fixed(usize);

    impl LevelGenerator for Fixed {
        fn total(&self) -> usize {
            self.0
        }

        fn height(&mut self) -> usize {
            self.0
        }
    }

    #[test]
    fn boxed() {
        let mut generator: Box<dyn LevelGenerator> = Box::new(Fixed(3));
        assert_eq!(generator.total(), 3);
        assert_eq!(generator.height(), 3);

        let mut generator: Box<dyn LevelGenerator> = Box::new(Geometric::default());
        assert_eq!(generator.total(), 32);
        assert!((1..=32).contains(&generator.height()));
    }
}
