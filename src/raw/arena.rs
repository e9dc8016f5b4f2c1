use alloc::vec::Vec;

use super::handle::Handle;

/// Counts how many times a slot has been vacated.
///
/// Pairing a [`Handle`] with the generation it was allocated under lets callers
/// tell a live element from a stale reference to a reused slot. A slot whose
/// generation reaches `Generation::MAX` is never handed out again, so a stale
/// pair can not resolve after the counter would have wrapped.
pub(crate) type Generation = u32;

#[derive(Clone)]
struct Slot<T> {
    element: Option<T>,
    generation: Generation,
}

/// Slot storage with stable indices and a free list.
///
/// Removing an element never moves any other element, so a [`Handle`] stays
/// valid until its own element is taken.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<Handle>,
    // Empty slots whose generation is exhausted.
    retired: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            retired: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            retired: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len() + self.retired)
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            let slot = &mut self.slots[h.to_index()];
            debug_assert!(slot.element.is_none(), "free list names an occupied slot");
            slot.element = Some(element);
            log::trace!("arena: reusing slot {h:?} at generation {}", slot.generation);
            h
        } else {
            // At most `Handle::MAX` live elements, so a tree's root size always
            // fits in a `Size`.
            assert!(
                self.slots.len() < Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Slot {
                element: Some(element),
                generation: 0,
            });
            Handle::from_index(self.slots.len() - 1)
        }
    }

    /// Generation the slot behind `handle` is currently in.
    #[inline]
    pub(crate) fn generation(&self, handle: Handle) -> Generation {
        self.slots[handle.to_index()].generation
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()]
            .element
            .as_ref()
            .expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()]
            .element
            .as_mut()
            .expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Looks up an element by a possibly stale `(handle, generation)` pair.
    pub(crate) fn try_get(&self, handle: Handle, generation: Generation) -> Option<&T> {
        let slot = self.slots.get(handle.to_index())?;
        if slot.generation == generation {
            slot.element.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let slot = &mut self.slots[handle.to_index()];
        let element = slot.element.take().expect("`Arena::take()` - `handle` is invalid!");
        slot.generation += 1;
        if slot.generation == Generation::MAX {
            log::trace!("arena: slot {handle:?} exhausted its generations, retiring it");
            self.retired += 1;
        } else {
            self.free.push(handle);
        }
        element
    }

    /// Drops every element and releases all slots, generations included.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.retired = 0;
    }

    /// Drops every element but keeps the slots, advancing the generation of
    /// each occupied one so that outstanding `(handle, generation)` pairs stop
    /// resolving.
    pub(crate) fn retire_all(&mut self) {
        self.free.clear();
        self.retired = 0;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.element.take().is_some() {
                slot.generation += 1;
            }
            if slot.generation == Generation::MAX {
                self.retired += 1;
            } else {
                self.free.push(Handle::from_index(index));
            }
        }
    }
}
