//! Fixed-capacity slot pool with an index free list
//!
//! Projectiles and particles live in pools: a slot is either occupied or on
//! the free list, allocation pops the free list in O(1), and a slot is only
//! handed out again after it has been released.

/// Capped pool of `T` with stable slot indices
#[derive(Debug, Clone)]
pub struct SlotPool<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
}

impl<T> SlotPool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            // Reversed so the lowest index is handed out first
            free: (0..capacity).rev().collect(),
        }
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every slot is occupied
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Number of slots available for insertion
    #[cfg(test)]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Store `value` in a free slot; gives it back if the pool is full
    pub fn insert(&mut self, value: T) -> Result<usize, T> {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(value);
                Ok(index)
            },
            None => Err(value),
        }
    }

    /// Release a slot, returning what it held
    #[cfg(test)]
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let value = self.slots.get_mut(index)?.take()?;
        self.free.push(index);
        Some(value)
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.as_ref()
    }

    /// Occupied slots with their indices
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }

    /// Keep only the occupied slots for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(value) = slot {
                if !keep(value) {
                    *slot = None;
                    self.free.push(index);
                }
            }
        }
    }

    /// Fill every free slot with values from `make`; returns how many were added
    pub fn fill(&mut self, mut make: impl FnMut() -> T) -> usize {
        let count = self.free.len();
        while let Some(index) = self.free.pop() {
            self.slots[index] = Some(make());
        }
        count
    }
}
