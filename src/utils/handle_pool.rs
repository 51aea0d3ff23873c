use std::marker::PhantomData;

use super::handle::{HandleIndex, HandleLike};

/// `HandlePool` hands out handles with a continuous `index` field and keeps
/// track of which of them are still alive. Freed indices are recycled with a
/// bumped version, so a stale handle is always recognizable.
pub struct HandlePool<H: HandleLike> {
    versions: Vec<HandleIndex>,
    frees: Vec<HandleIndex>,
    _marker: PhantomData<H>,
}

impl<H: HandleLike> Default for HandlePool<H> {
    fn default() -> Self {
        HandlePool::new()
    }
}

impl<H: HandleLike> HandlePool<H> {
    /// Constructs a new, empty `HandlePool`.
    pub fn new() -> Self {
        HandlePool {
            versions: Vec::new(),
            frees: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Creates an unused handle.
    pub fn create(&mut self) -> H {
        if let Some(index) = self.frees.pop() {
            self.versions[index as usize] += 1;
            H::new(index, self.versions[index as usize])
        } else {
            // Odd versions are alive, even versions are dead.
            self.versions.push(1);
            H::new(self.versions.len() as HandleIndex - 1, 1)
        }
    }

    /// Returns true if this handle was created by the pool and has not been
    /// freed yet.
    pub fn is_alive(&self, handle: H) -> bool {
        let index = handle.index() as usize;
        index < self.versions.len()
            && (self.versions[index] & 0x1) == 1
            && self.versions[index] == handle.version()
    }

    /// Recycles the handle index and marks its version as dead. Returns false
    /// for stale or foreign handles.
    pub fn free(&mut self, handle: H) -> bool {
        if !self.is_alive(handle) {
            false
        } else {
            self.versions[handle.index() as usize] += 1;
            self.frees.push(handle.index());
            true
        }
    }

    /// Returns the total number of alive handles.
    pub fn len(&self) -> usize {
        self.versions.len() - self.frees.len()
    }

    /// Checks if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::handle::Handle;

    #[test]
    fn recycle_bumps_version() {
        let mut pool: HandlePool<Handle> = HandlePool::new();

        let h1 = pool.create();
        assert!(pool.is_alive(h1));
        assert_eq!(pool.len(), 1);

        assert!(pool.free(h1));
        assert!(!pool.is_alive(h1));
        assert!(!pool.free(h1));
        assert_eq!(pool.len(), 0);

        let h2 = pool.create();
        assert_eq!(h1.index(), h2.index());
        assert_ne!(h1.version(), h2.version());
        assert!(!pool.is_alive(h1));
        assert!(pool.is_alive(h2));
    }
}
