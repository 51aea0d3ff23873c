use std::borrow::Borrow;

use super::handle::Handle;

/// Backend-side storage keyed by handle index. The version field guards
/// against reads through stale handles after an index has been recycled.
#[derive(Debug)]
pub struct DataVec<T: Sized> {
    buf: Vec<Option<T>>,
    versions: Vec<u32>,
}

impl<T: Sized> DataVec<T> {
    pub fn new() -> Self {
        DataVec {
            buf: Vec::new(),
            versions: Vec::new(),
        }
    }

    pub fn get<H>(&self, handle: H) -> Option<&T>
    where
        H: Borrow<Handle>,
    {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => self.buf[index].as_ref(),
            _ => None,
        }
    }

    pub fn get_mut<H>(&mut self, handle: H) -> Option<&mut T>
    where
        H: Borrow<Handle>,
    {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => self.buf[index].as_mut(),
            _ => None,
        }
    }

    pub fn create<H>(&mut self, handle: H, value: T)
    where
        H: Borrow<Handle>,
    {
        let handle = handle.borrow();
        let index = handle.index() as usize;

        if self.buf.len() <= index {
            self.buf.resize_with(index + 1, || None);
            self.versions.resize(index + 1, 0);
        }

        self.buf[index] = Some(value);
        self.versions[index] = handle.version();
    }

    pub fn free<H>(&mut self, handle: H) -> Option<T>
    where
        H: Borrow<Handle>,
    {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => self.buf[index].take(),
            _ => None,
        }
    }
}

impl<T: Sized> Default for DataVec<T> {
    fn default() -> Self {
        DataVec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_handles_cannot_touch_recycled_slots() {
        let mut data: DataVec<&'static str> = DataVec::new();

        let stale = Handle::new(0, 1);
        data.create(stale, "old");
        assert_eq!(data.free(stale), Some("old"));

        // The index is recycled under a bumped version; the stale handle
        // must see nothing and evict nothing.
        let fresh = Handle::new(0, 3);
        data.create(fresh, "new");
        assert_eq!(data.get(stale), None);
        assert_eq!(data.free(stale), None);
        assert_eq!(data.free(fresh), Some("new"));
    }
}
