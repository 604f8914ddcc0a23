use std::mem;
use std::ops::{Index, IndexMut};

/// Fixed-size circular buffer used for lookahead.
///
/// Index 0 is the front; [`Ring::put`] pushes at the back and returns the
/// element that falls out at the front.
#[derive(Debug, Clone)]
pub struct Ring<T, const N: usize> {
    array: [T; N],
    first: usize,
}

impl<T, const N: usize> Ring<T, N> {
    const NON_EMPTY: () = assert!(N > 0, "a Ring needs at least one slot");

    #[inline]
    fn slot(&self, i: usize) -> usize {
        debug_assert!(i < N, "ring index {i} out of bounds for {N} slots");
        (self.first + i) % N
    }

    #[inline]
    pub fn front(&self) -> &T {
        &self.array[self.first]
    }

    #[inline]
    pub fn front_mut(&mut self) -> &mut T {
        &mut self.array[self.first]
    }

    /// Make the physical first slot the front again.
    pub fn reset(&mut self) {
        self.first = 0;
    }

    pub fn put(&mut self, item: T) -> T {
        let res = mem::replace(&mut self.array[self.first], item);
        self.first = (self.first + 1) % N;
        res
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl<T, const N: usize> From<[T; N]> for Ring<T, N> {
    fn from(array: [T; N]) -> Self {
        let () = Self::NON_EMPTY;
        Self { array, first: 0 }
    }
}

impl<T: Default, const N: usize> Default for Ring<T, N> {
    fn default() -> Self {
        Self::from(std::array::from_fn(|_| T::default()))
    }
}

impl<T, const N: usize> Index<usize> for Ring<T, N> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.array[self.slot(i)]
    }
}

impl<T, const N: usize> IndexMut<usize> for Ring<T, N> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        let slot = self.slot(i);
        &mut self.array[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring1() {
        let mut ring = Ring::from(['a']);
        assert_eq!(*ring.front(), 'a');
        assert_eq!(ring[0], 'a');
        assert_eq!(ring.put('b'), 'a');
        assert_eq!(*ring.front(), 'b');
        assert_eq!(ring.put('c'), 'b');
        assert_eq!(ring[0], 'c');
    }

    #[test]
    fn ring2() {
        let mut ring = Ring::from(['a', 'b']);
        assert_eq!((ring[0], ring[1]), ('a', 'b'));
        assert_eq!(ring.put('c'), 'a');
        assert_eq!((ring[0], ring[1]), ('b', 'c'));
        assert_eq!(ring.put('d'), 'b');
        assert_eq!((ring[0], ring[1]), ('c', 'd'));
    }

    #[test]
    fn ring3() {
        let mut ring = Ring::from(['a', 'b', 'c']);
        assert_eq!(ring.put('d'), 'a');
        assert_eq!((ring[0], ring[1], ring[2]), ('b', 'c', 'd'));
        assert_eq!(ring.put('e'), 'b');
        assert_eq!((ring[0], ring[1], ring[2]), ('c', 'd', 'e'));
        assert_eq!(ring.put('f'), 'c');
        assert_eq!((ring[0], ring[1], ring[2]), ('d', 'e', 'f'));
        assert_eq!(*ring.front(), 'd');
    }

    #[test]
    fn index_mut_and_reset() {
        let mut ring: Ring<u8, 3> = Ring::default();
        ring.put(1);
        ring[0] = 7;
        assert_eq!(ring[0], 7);
        ring.reset();
        assert_eq!(ring[0], 1);
        assert_eq!(ring[1], 7);
    }

    #[test]
    fn owns_non_copy_items() {
        let mut ring: Ring<String, 2> = Ring::default();
        ring.put("x".into());
        ring.put("y".into());
        assert_eq!(ring.put("z".into()), "x");
        assert_eq!(ring[1], "z");
    }
}
