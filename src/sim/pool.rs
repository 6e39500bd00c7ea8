//! Object pools
//!
//! Pools are the only place entities are constructed. Everything else holds
//! a generational [`Handle`]; once an entity is released its old handles go
//! stale, so releasing twice (or reading through a recycled handle) is a
//! harmless no-op instead of aliasing a reused slot.

use std::fmt;
use std::marker::PhantomData;

/// Entities that can live in a [`Pool`]
pub trait Poolable: Default {
    /// Drop per-activation state when returned to the pool
    fn deactivate(&mut self);
}

/// Generational reference to a pooled entity
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    item: T,
    active: bool,
    generation: u32,
}

/// Lifetime counters, for diagnostics and leak checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Entities ever constructed
    pub created: u64,
    pub acquired: u64,
    pub released: u64,
}

/// Reuse container for one kind of entity
#[derive(Debug)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    stats: PoolStats,
}

impl<T: Poolable> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Poolable> Pool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            stats: PoolStats::default(),
        }
    }

    fn push_slot(&mut self) -> usize {
        self.slots.push(Slot {
            item: T::default(),
            active: false,
            generation: 0,
        });
        self.stats.created += 1;
        self.slots.len() - 1
    }

    /// Activate the first free entity (growing the pool if none is free)
    /// and reinitialise it with `init`
    pub fn acquire(&mut self, init: impl FnOnce(&mut T)) -> Handle<T> {
        let index = match self.slots.iter().position(|s| !s.active) {
            Some(i) => i,
            None => self.push_slot(),
        };
        let slot = &mut self.slots[index];
        init(&mut slot.item);
        slot.active = true;
        self.stats.acquired += 1;
        Handle {
            index: index as u32,
            generation: slot.generation,
            _marker: PhantomData,
        }
    }

    /// Return an entity to the pool
    ///
    /// Returns `false` (and does nothing) when the handle is stale or the
    /// entity is already inactive.
    pub fn release(&mut self, handle: Handle<T>) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return false;
        };
        if !slot.active || slot.generation != handle.generation {
            return false;
        }
        slot.item.deactivate();
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.stats.released += 1;
        true
    }

    /// Release every active entity
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for slot in self.slots.iter_mut().filter(|s| s.active) {
            slot.item.deactivate();
            slot.active = false;
            slot.generation = slot.generation.wrapping_add(1);
            released += 1;
        }
        self.stats.released += released as u64;
        released
    }

    pub fn is_live(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.active && s.generation == handle.generation)
            .map(|s| &s.item)
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.active && s.generation == handle.generation)
            .map(|s| &mut s.item)
    }

    /// Active entities with their handles
    pub fn all_active(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.active).map(|(i, s)| {
            (
                Handle {
                    index: i as u32,
                    generation: s.generation,
                    _marker: PhantomData,
                },
                &s.item,
            )
        })
    }

    pub fn all_active_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| {
                (
                    Handle {
                        index: i as u32,
                        generation: s.generation,
                        _marker: PhantomData,
                    },
                    &mut s.item,
                )
            })
    }

    /// Every entity the pool owns, active or not
    pub fn all_entities(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().map(|s| &s.item)
    }

    /// Total entities constructed and retained
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}
