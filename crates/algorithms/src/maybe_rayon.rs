/// Parallel/sequential execution shim.
///
/// With the `parallel` feature enabled this re-exports rayon's prelude.
/// Without it, a sequential stand-in offers the same `into_par_iter()`
/// entry point so algorithm code compiles unchanged on single-threaded
/// targets.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential replacement for `rayon::prelude::IntoParallelIterator`.
    ///
    /// `into_par_iter()` resolves to a plain `into_iter()`, so the rest of
    /// the chain (`.map()`, `.flat_map()`, `.collect()`, ...) uses the
    /// standard `Iterator` methods.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
