//! Infinite, stateful value sequences that can be embedded in schemas.
//!
//! A sequence embedded in a schema is shared by reference: every schema
//! clone, and every factory built from the same schema value, advances the
//! same cursor. This is how round-robin values are spread across builds.

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::node::Node;

/// Source of an endless stream of values.
pub trait Sequence<T> {
    fn next(&mut self) -> T;
}

/// Yields the collection's elements in order, wrapping around forever.
#[derive(Debug, Clone)]
pub struct Cycle<T> {
    values: Vec<T>,
    cursor: usize,
}

impl<T: Clone> Cycle<T> {
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn new<I: IntoIterator<Item = T>>(values: I) -> Self {
        let values: Vec<T> = values.into_iter().collect();
        assert!(!values.is_empty(), "cycle requires at least one value");
        Self { values, cursor: 0 }
    }
}

impl<T: Clone> Sequence<T> for Cycle<T> {
    fn next(&mut self) -> T {
        let value = self.values[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.values.len();
        value
    }
}

/// Yields uniformly random elements, never the same value twice in a row
/// when the collection holds at least two distinct values.
#[derive(Debug, Clone)]
pub struct Sample<T> {
    values: Vec<T>,
    last: Option<usize>,
    distinct: bool,
    rng: ChaCha8Rng,
}

impl<T: Clone + PartialEq> Sample<T> {
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn new<I: IntoIterator<Item = T>>(values: I) -> Self {
        Self::with_seed(values, rand::random())
    }

    /// Deterministic variant for reproducible test data.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn with_seed<I: IntoIterator<Item = T>>(values: I, seed: u64) -> Self {
        let values: Vec<T> = values.into_iter().collect();
        assert!(!values.is_empty(), "sample requires at least one value");
        let distinct = values.iter().any(|value| *value != values[0]);
        Self {
            values,
            last: None,
            distinct,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<T: Clone + PartialEq> Sequence<T> for Sample<T> {
    fn next(&mut self) -> T {
        if !self.distinct {
            return self.values[0].clone();
        }
        let len = self.values.len();
        let mut index = self.rng.random_range(0..len);
        while self
            .last
            .is_some_and(|last| self.values[last] == self.values[index])
        {
            index = self.rng.random_range(0..len);
        }
        self.last = Some(index);
        self.values[index].clone()
    }
}

/// Type-erased sequence of schema nodes, shared between clones.
#[derive(Clone)]
pub struct SharedSequence(Arc<Mutex<dyn Sequence<Node> + Send>>);

impl SharedSequence {
    pub fn new<S, T>(sequence: S) -> Self
    where
        S: Sequence<T> + Send + 'static,
        T: Into<Node> + 'static,
    {
        Self(Arc::new(Mutex::new(IntoNodes {
            inner: sequence,
            _marker: PhantomData,
        })))
    }

    /// Advance the shared cursor by one.
    pub fn pull(&self) -> Node {
        self.0.lock().next()
    }
}

struct IntoNodes<S, T> {
    inner: S,
    _marker: PhantomData<fn() -> T>,
}

impl<S, T> Sequence<Node> for IntoNodes<S, T>
where
    S: Sequence<T>,
    T: Into<Node>,
{
    fn next(&mut self) -> Node {
        self.inner.next().into()
    }
}
