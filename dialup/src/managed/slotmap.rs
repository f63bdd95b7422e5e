/// A map with stable, generation checked keys and bounded capacity.
///
/// A slotmap provides a `Vec`-like interface where each entry is associated with a stable
/// index-like key. Lookup with the key will detect if an entry has been removed but does not
/// require any lifetime relation. Storage grows with the number of elements up to the capacity,
/// inserting into a full map fails.
///
/// ## Usage
///
/// ```
/// # use dialup::managed::SlotMap;
/// let mut map = SlotMap::with_capacity(16);
/// let key = map.insert(42).unwrap();
/// assert_eq!(map.get(key).cloned(), Some(42));
/// assert_eq!(map.remove(key), Some(42));
/// assert_eq!(map.get(key), None);
/// ```
#[derive(Debug)]
pub struct SlotMap<T> {
    elements: Vec<Option<T>>,
    slots: Vec<Slot>,
    generation: Generation,
    free_top: Option<usize>,
    len: usize,
    capacity: usize,
}

/// An index into a slotmap.
///
/// The index remains valid until the entry is removed. Accessing the slotmap with the index
/// after the entry was removed will fail, even if the slot where the element was previously
/// stored has been reused for another element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    idx: usize,
    generation: Generation,
}

/// Provides links between slots and elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Slot {
    /// The id of the element in this slot.
    Occupied(Generation),
    /// The slot is unused and links to the next free slot.
    Free { next: Option<usize> },
}

/// The generation counter.
///
/// Has strictly positive values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Generation(usize);

impl<T> SlotMap<T> {
    /// Create an empty map holding at most `capacity` elements.
    ///
    /// Nothing is allocated until the first insertion.
    pub fn with_capacity(capacity: usize) -> Self {
        SlotMap {
            elements: Vec::new(),
            slots: Vec::new(),
            generation: Generation::default(),
            free_top: None,
            len: 0,
            capacity,
        }
    }

    /// The number of elements that fit into the map.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of elements currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Query whether the map holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve a value by index.
    pub fn get(&self, index: Key) -> Option<&T> {
        match self.slots.get(index.idx)? {
            Slot::Occupied(generation) if *generation == index.generation => {
                self.elements[index.idx].as_ref()
            },
            _ => None,
        }
    }

    /// Retrieve a mutable value by index.
    pub fn get_mut(&mut self, index: Key) -> Option<&mut T> {
        match self.slots.get(index.idx)? {
            Slot::Occupied(generation) if *generation == index.generation => {
                self.elements[index.idx].as_mut()
            },
            _ => None,
        }
    }

    /// Insert a value, returning its key.
    ///
    /// Returns `None` if the map is full.
    pub fn insert(&mut self, value: T) -> Option<Key> {
        let idx = match self.free_top {
            Some(idx) => {
                self.free_top = match self.slots[idx] {
                    Slot::Free { next } => next,
                    Slot::Occupied(_) => unreachable!("free list links an occupied slot"),
                };
                self.elements[idx] = Some(value);
                idx
            },
            None if self.slots.len() < self.capacity => {
                self.slots.push(Slot::Free { next: None });
                self.elements.push(Some(value));
                self.slots.len() - 1
            },
            None => return None,
        };

        let key = Key {
            idx,
            generation: self.generation,
        };
        self.slots[idx] = Slot::Occupied(self.generation);
        self.generation.advance();
        self.len += 1;
        Some(key)
    }

    /// Remove an element.
    ///
    /// Returns `None` if the provided index did not refer to an element that could be freed.
    pub fn remove(&mut self, index: Key) -> Option<T> {
        if self.get(index).is_none() {
            return None;
        }

        self.slots[index.idx] = Slot::Free { next: self.free_top };
        self.free_top = Some(index.idx);
        self.len -= 1;
        self.elements[index.idx].take()
    }

    /// Iterate over all elements and their keys.
    pub fn iter(&self) -> impl Iterator<Item=(Key, &T)> + '_ {
        self.slots.iter()
            .zip(self.elements.iter())
            .enumerate()
            .filter_map(|(idx, (slot, element))| match (slot, element) {
                (Slot::Occupied(generation), Some(element)) => {
                    Some((Key { idx, generation: *generation }, element))
                },
                _ => None,
            })
    }
}

impl Generation {
    fn advance(&mut self) {
        assert!(self.0 > 0);
        self.0 = self.0.wrapping_add(1).max(1)
    }
}

impl Default for Generation {
    fn default() -> Self {
        Generation(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple() {
        let mut map = SlotMap::with_capacity(2);
        let key42 = map.insert(42u32).unwrap();
        let keylo = map.insert('K' as _).unwrap();

        assert_eq!(map.insert(0x9999), None);
        assert_eq!(map.get(key42).cloned(), Some(42));
        assert_eq!(map.get(keylo).cloned(), Some('K' as _));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn retained() {
        let mut map = SlotMap::with_capacity(1);
        let key = map.insert(0xdeu32).unwrap();
        assert_eq!(map.remove(key), Some(0xde));
        assert_eq!(map.get(key), None);

        let new_key = map.insert(0xad).unwrap();

        assert_eq!(map.get(key), None);
        assert_eq!(map.get(new_key).cloned(), Some(0xad));
        assert_eq!(map.len(), 1);

        assert_eq!(map.remove(key), None);
        map.remove(new_key).unwrap();

        assert_eq!(map.get(key), None);
        assert_eq!(map.get(new_key), None);
        assert!(map.is_empty());
    }

    #[test]
    fn iterate() {
        let mut map = SlotMap::with_capacity(4);
        let a = map.insert('a').unwrap();
        let b = map.insert('b').unwrap();
        let c = map.insert('c').unwrap();
        map.remove(b);

        let entries: Vec<_> = map.iter().map(|(key, value)| (key, *value)).collect();
        assert_eq!(entries, vec![(a, 'a'), (c, 'c')]);

        *map.get_mut(c).unwrap() = 'C';
        assert_eq!(map.get(c), Some(&'C'));
    }

    #[test]
    fn grows_on_demand() {
        let mut map = SlotMap::with_capacity(1 << 24);
        assert_eq!(map.capacity(), 1 << 24);
        assert_eq!(map.slots.capacity(), 0);

        let keys: Vec<_> = (0..100u32).map(|value| map.insert(value).unwrap()).collect();
        assert_eq!(map.len(), 100);
        assert_eq!(map.slots.len(), 100);

        for key in &keys[..50] {
            map.remove(*key).unwrap();
        }
        assert_eq!(map.len(), 50);

        // Freed slots are reused before the storage grows.
        for value in 0..50u32 {
            map.insert(value).unwrap();
        }
        assert_eq!(map.slots.len(), 100);
        assert_eq!(map.len(), 100);
    }
}
