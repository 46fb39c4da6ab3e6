//! Generation-tagged lazy cache.
//!
//! The engine derives its compiled patterns and curated indexes from data
//! that external tooling may edit between checks. Rather than scattering
//! "is it built yet" flags, the derived state lives in one slot that is
//! filled by a single rebuild closure and emptied by [`Generational::invalidate`],
//! which also starts a new generation.

use once_cell::unsync::OnceCell;

#[derive(Debug)]
pub struct Generational<T> {
    generation: u64,
    slot: OnceCell<T>,
}

impl<T> Generational<T> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            slot: OnceCell::new(),
        }
    }

    /// The cached value, rebuilding it first if this generation has none
    pub fn get_or_rebuild(&self, rebuild: impl FnOnce(u64) -> T) -> &T {
        self.slot.get_or_init(|| rebuild(self.generation))
    }

    /// Drop the cached value and start a new generation
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.slot.take();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_built(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<T> Default for Generational<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_builds_once_per_generation() {
        let builds = Cell::new(0);
        let mut cache: Generational<u64> = Generational::new();
        assert!(!cache.is_built());

        for _ in 0..3 {
            let value = cache.get_or_rebuild(|generation| {
                builds.set(builds.get() + 1);
                generation * 10
            });
            assert_eq!(*value, 0);
        }
        assert_eq!(builds.get(), 1);

        cache.invalidate();
        assert!(!cache.is_built());
        assert_eq!(cache.generation(), 1);

        let value = cache.get_or_rebuild(|generation| {
            builds.set(builds.get() + 1);
            generation * 10
        });
        assert_eq!(*value, 10);
        assert_eq!(builds.get(), 2);
    }
}
