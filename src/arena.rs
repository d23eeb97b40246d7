//! Generation checked slot storage
//!
//! Every entity of a game lives in one of these arenas and is referred to by a [Key]. A key
//! records the slot index, the generation of the slot when the entity was inserted, and the tag
//! of the game that issued it. Removing an entity bumps the slot generation, so stale keys and
//! keys from a different game both fail lookup instead of aliasing some other entity.
use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};
use std::slice;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_TAG: AtomicU32 = AtomicU32::new(0);

/// Allocate a tag that no other game in this process has
pub fn fresh_tag() -> u32 {
    NEXT_TAG.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    tag: u32,
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot<V> {
    generation: u32,
    value: Option<V>,
}

#[derive(Debug, Clone)]
pub struct Arena<V> {
    tag: u32,
    slots: Vec<Slot<V>>,
    free: Vec<u32>,
    len: usize,
}

impl<V> Arena<V> {
    pub fn new(tag: u32) -> Self {
        Arena {
            tag,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: V) -> Key {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            Key {
                tag: self.tag,
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(self.slots.len()).expect("arena exceeded u32 slots");
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            Key {
                tag: self.tag,
                index,
                generation: 0,
            }
        }
    }

    fn slot(&self, key: Key) -> Option<&Slot<V>> {
        if key.tag == self.tag {
            self.slots
                .get(key.index as usize)
                .filter(|slot| slot.generation == key.generation)
        } else {
            None
        }
    }

    pub fn contains(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: Key) -> Option<&V> {
        self.slot(key).and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        if key.tag != self.tag {
            return None;
        }
        self.slots
            .get_mut(key.index as usize)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn remove(&mut self, key: Key) -> Option<V> {
        if key.tag != self.tag {
            return None;
        }
        let slot = self
            .slots
            .get_mut(key.index as usize)
            .filter(|slot| slot.generation == key.generation)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        self.len -= 1;
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            tag: self.tag,
            iter: self.slots.iter().enumerate(),
            remaining: self.len,
        }
    }
}

impl<V> Index<Key> for Arena<V> {
    type Output = V;

    fn index(&self, key: Key) -> &V {
        self.get(key)
            .unwrap_or_else(|| panic!("{key:?} does not refer to a live entry of this game"))
    }
}

impl<V> IndexMut<Key> for Arena<V> {
    fn index_mut(&mut self, key: Key) -> &mut V {
        self.get_mut(key)
            .unwrap_or_else(|| panic!("{key:?} does not refer to a live entry of this game"))
    }
}

pub struct Iter<'a, V> {
    tag: u32,
    iter: std::iter::Enumerate<slice::Iter<'a, Slot<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Key, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for (index, slot) in self.iter.by_ref() {
            if let Some(value) = &slot.value {
                self.remaining -= 1;
                let key = Key {
                    tag: self.tag,
                    index: index as u32,
                    generation: slot.generation,
                };
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> FusedIterator for Iter<'_, V> {}

impl<V> ExactSizeIterator for Iter<'_, V> {}
