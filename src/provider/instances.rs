//! Lazily activated per-binding instance storage.

use std::cell::Cell;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::OnceCell;

use crate::binding::{AnyArc, Binding, BindingSet};
use crate::error::DiResult;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;

/// Instance slots for one lifetime partition of a binding set.
///
/// Each binding owns the slot addressed by its unique index. A slot starts
/// empty and is written at most once: observing it as initialized (the
/// `OnceCell` does so with acquire ordering against the writer's release
/// store) guarantees the stored instance is fully constructed. The change
/// mutex serializes the empty-to-initialized transition so concurrent
/// resolvers activate a service exactly once; a factory that fails leaves
/// its slot empty, so a later resolution can retry.
pub(crate) struct InstanceSet {
    slots: Box<[OnceCell<AnyArc>]>,
    change_mutex: Mutex<()>,
}

impl InstanceSet {
    /// Creates the instance storage for one cached partition of `bindings`.
    /// Unique indices must already be assigned.
    pub(crate) fn for_partition(bindings: &BindingSet, lifetime: Lifetime) -> Self {
        let slot_count = match lifetime {
            Lifetime::Singleton => bindings.singleton_slots,
            Lifetime::Scoped => bindings.scoped_slots,
            Lifetime::Transient => 0, // transient services are never cached
        };
        Self {
            slots: (0..slot_count)
                .map(|_| OnceCell::new())
                .collect::<Vec<_>>()
                .into_boxed_slice(),
            change_mutex: Mutex::new(()),
        }
    }

    /// Returns the binding's instance, activating it on first use.
    ///
    /// `lock_held` is the context's record of whether this set's change
    /// mutex is already held further up the resolution stack; a factory
    /// resolving its own dependencies re-enters this method under the outer
    /// activation, which already serializes it.
    pub(crate) fn fetch_or_activate(
        &self,
        binding: &Binding,
        context: &ResolverContext<'_>,
        lock_held: &Cell<bool>,
    ) -> DiResult<AnyArc> {
        let slot = &self.slots[binding.unique_index];
        if let Some(instance) = slot.get() {
            return Ok(instance.clone());
        }

        let _guard = if lock_held.get() {
            None
        } else {
            Some(ChangeGuard::acquire(&self.change_mutex, lock_held))
        };

        // Re-check: another thread may have activated the service while
        // this one was waiting for the mutex.
        if let Some(instance) = slot.get() {
            return Ok(instance.clone());
        }

        let instance = binding.instantiate(context)?;
        let _ = slot.set(instance.clone());
        Ok(instance)
    }
}

impl Drop for InstanceSet {
    fn drop(&mut self) {
        // Tear down activated instances in reverse activation-slot order.
        for slot in self.slots.iter_mut().rev() {
            drop(slot.take());
        }
    }
}

/// Holds the change mutex and keeps the context's lock flag accurate even
/// when a factory fails or unwinds.
struct ChangeGuard<'a, 'b> {
    _guard: MutexGuard<'a, ()>,
    lock_held: &'b Cell<bool>,
}

impl<'a, 'b> ChangeGuard<'a, 'b> {
    fn acquire(change_mutex: &'a Mutex<()>, lock_held: &'b Cell<bool>) -> Self {
        // A factory that panicked mid-activation poisons the mutex but
        // leaves its slot empty; later resolutions must still be able to
        // retry the activation.
        let guard = change_mutex
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        lock_held.set(true);
        Self {
            _guard: guard,
            lock_held,
        }
    }
}

impl Drop for ChangeGuard<'_, '_> {
    fn drop(&mut self) {
        self.lock_held.set(false);
    }
}
