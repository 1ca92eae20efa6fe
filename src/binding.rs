//! Service binding storage.
//!
//! A [`Binding`] captures how one service key is materialized; a
//! [`BindingSet`] is the registry the collection fills and the provider
//! reads, partitioned by lifetime. After `build()` the set is immutable and
//! shared read-only between the provider and every scope.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

pub(crate) type FactoryFn =
    Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;
pub(crate) type CloneFn = Arc<dyn Fn(&AnyArc) -> DiResult<AnyArc> + Send + Sync>;

/// How a binding produces an instance: exactly one of a factory closure or
/// a prototype value plus the clone factory that copies it.
pub(crate) enum Constructor {
    Factory(FactoryFn),
    Prototype {
        prototype: AnyArc,
        clone_factory: CloneFn,
    },
}

/// One registered service binding.
pub(crate) struct Binding {
    pub(crate) ctor: Constructor,
    /// Dense per-partition slot index, assigned once at build time.
    pub(crate) unique_index: usize,
}

impl Binding {
    pub(crate) fn new(ctor: Constructor) -> Self {
        Self {
            ctor,
            unique_index: usize::MAX, // assigned by assign_unique_indices()
        }
    }

    /// Produces a new instance, either by invoking the factory with the
    /// caller's resolution context or by cloning the prototype.
    pub(crate) fn instantiate(&self, context: &ResolverContext<'_>) -> DiResult<AnyArc> {
        match &self.ctor {
            Constructor::Factory(factory) => factory(context),
            Constructor::Prototype {
                prototype,
                clone_factory,
            } => clone_factory(prototype),
        }
    }
}

type BindingMultiMap = HashMap<Key, Vec<Binding>>;

/// Registry of bindings, partitioned by lifetime.
///
/// Multiple bindings per key are permitted; a single-service lookup returns
/// the most recently registered one. Registering a key under one lifetime
/// evicts it from the other two partitions, so a key lives in exactly one
/// partition at a time.
pub(crate) struct BindingSet {
    singletons: BindingMultiMap,
    scoped: BindingMultiMap,
    transients: BindingMultiMap,
    /// Slot counts per cached partition, valid after assign_unique_indices().
    pub(crate) singleton_slots: usize,
    pub(crate) scoped_slots: usize,
}

impl BindingSet {
    pub(crate) fn new() -> Self {
        Self {
            singletons: HashMap::new(),
            scoped: HashMap::new(),
            transients: HashMap::new(),
            singleton_slots: 0,
            scoped_slots: 0,
        }
    }

    fn partition(&self, lifetime: Lifetime) -> &BindingMultiMap {
        match lifetime {
            Lifetime::Singleton => &self.singletons,
            Lifetime::Scoped => &self.scoped,
            Lifetime::Transient => &self.transients,
        }
    }

    fn partition_mut(&mut self, lifetime: Lifetime) -> &mut BindingMultiMap {
        match lifetime {
            Lifetime::Singleton => &mut self.singletons,
            Lifetime::Scoped => &mut self.scoped,
            Lifetime::Transient => &mut self.transients,
        }
    }

    /// Inserts a binding into the chosen lifetime partition and evicts any
    /// bindings for the same key from the other two partitions.
    pub(crate) fn add(&mut self, key: Key, lifetime: Lifetime, ctor: Constructor) {
        for other in [Lifetime::Singleton, Lifetime::Scoped, Lifetime::Transient] {
            if other != lifetime {
                self.partition_mut(other).remove(&key);
            }
        }
        self.partition_mut(lifetime)
            .entry(key)
            .or_default()
            .push(Binding::new(ctor));
    }

    /// Erases the key from all three partitions, returning how many bindings
    /// were removed.
    pub(crate) fn remove_all(&mut self, key: &Key) -> usize {
        let mut removed = 0;
        for lifetime in [Lifetime::Singleton, Lifetime::Scoped, Lifetime::Transient] {
            if let Some(bindings) = self.partition_mut(lifetime).remove(key) {
                removed += bindings.len();
            }
        }
        removed
    }

    /// Finds the most recently registered binding for a key in a partition.
    pub(crate) fn lookup_last(&self, key: &Key, lifetime: Lifetime) -> Option<&Binding> {
        self.partition(lifetime)
            .get(key)
            .and_then(|bindings| bindings.last())
    }

    /// Enumerates all bindings for a key in a partition, in registration order.
    pub(crate) fn lookup_all(&self, key: &Key, lifetime: Lifetime) -> Option<&[Binding]> {
        self.partition(lifetime)
            .get(key)
            .map(|bindings| bindings.as_slice())
    }

    pub(crate) fn contains(&self, key: &Key, lifetime: Lifetime) -> bool {
        self.partition(lifetime).contains_key(key)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn len(&self) -> usize {
        [Lifetime::Singleton, Lifetime::Scoped, Lifetime::Transient]
            .into_iter()
            .map(|lifetime| {
                self.partition(lifetime)
                    .values()
                    .map(|bindings| bindings.len())
                    .sum::<usize>()
            })
            .sum()
    }

    /// Walks each partition assigning dense 0-based slot indices. Indices are
    /// unique per partition, not across partitions, and are immutable after
    /// the provider is built.
    pub(crate) fn assign_unique_indices(&mut self) {
        for lifetime in [Lifetime::Singleton, Lifetime::Scoped, Lifetime::Transient] {
            let mut next_index = 0;
            for bindings in self.partition_mut(lifetime).values_mut() {
                for binding in bindings.iter_mut() {
                    binding.unique_index = next_index;
                    next_index += 1;
                }
            }
            match lifetime {
                Lifetime::Singleton => self.singleton_slots = next_index,
                Lifetime::Scoped => self.scoped_slots = next_index,
                Lifetime::Transient => {}
            }
        }
    }
}
