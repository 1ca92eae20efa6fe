//! Resolver context for dependency injection.
//!
//! This module contains the ResolverContext type which provides
//! the interface for factory functions to resolve dependencies and carries
//! the per-call resolution stack used for cycle detection.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::sync::Arc;

use crate::binding::AnyArc;
use crate::error::{DiError, DiResult};
use crate::internal::CircularPanic;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::scope::ScopeInner;
use crate::provider::{ProviderInner, Scope};
use crate::traits::{Resolver, ResolverCore};

/// Context passed to factory functions for resolving dependencies.
///
/// A ResolverContext lives for one resolution call chain. It acts as a
/// resolver towards factory functions, while carrying the stack of service
/// keys currently being resolved: requesting a key that is already on the
/// stack fails with [`DiError::Circular`] and the full dependency path.
///
/// The context is stack-resident and never shared between threads.
///
/// # Examples
///
/// ```
/// use ferrous_support::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database {
///     url: "postgres://localhost".to_string()
/// });
/// services.add_transient_factory::<UserService, _>(|resolver| {
///     // resolver is a ResolverContext that provides access to other services
///     UserService {
///         db: resolver.get_required::<Database>(),
///     }
/// });
/// ```
pub struct ResolverContext<'a> {
    provider: &'a ProviderInner,
    scope: Option<&'a ScopeInner>,
    /// Service keys currently under resolution, outermost first.
    stack: RefCell<Vec<Key>>,
    /// Whether this call chain already holds the respective change mutex.
    singleton_lock_held: Cell<bool>,
    scoped_lock_held: Cell<bool>,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn for_provider(provider: &'a ProviderInner) -> Self {
        Self {
            provider,
            scope: None,
            stack: RefCell::new(Vec::new()),
            singleton_lock_held: Cell::new(false),
            scoped_lock_held: Cell::new(false),
        }
    }

    pub(crate) fn for_scope(provider: &'a ProviderInner, scope: &'a ScopeInner) -> Self {
        Self {
            scope: Some(scope),
            ..Self::for_provider(provider)
        }
    }

    /// Scopes cannot be created during a factory call; nothing such a scope
    /// produced could outlive the call.
    pub fn create_scope(&self) -> DiResult<Scope> {
        Err(DiError::WrongLifetime(
            "Cannot create a scope during a factory call",
        ))
    }

    /// Checks for a cycle, pushes `key`, runs `resolve`, and pops again on
    /// exit.
    ///
    /// A cycle is raised as a [`CircularPanic`] rather than returned: the
    /// factory frames between here and the resolution root expect plain
    /// service values and cannot forward an error. The root converts the
    /// payload into [`DiError::Circular`]. The stale stack entries left by
    /// the unwind don't matter; the context is abandoned with it.
    fn with_key_on_stack<T>(
        &self,
        key: &Key,
        resolve: impl FnOnce() -> DiResult<T>,
    ) -> DiResult<T> {
        {
            let stack = self.stack.borrow();
            if stack.iter().any(|pending| pending == key) {
                let mut path: Vec<&'static str> =
                    stack.iter().map(|pending| pending.display_name()).collect();
                path.push(key.display_name());
                drop(stack);
                std::panic::panic_any(CircularPanic::new(path));
            }
        }
        self.stack.borrow_mut().push(key.clone());
        let result = resolve();
        self.stack.borrow_mut().pop();
        result
    }

    pub(crate) fn resolve_key(&self, key: &Key) -> DiResult<AnyArc> {
        self.with_key_on_stack(key, || self.dispatch(key))
    }

    pub(crate) fn resolve_key_all(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        self.with_key_on_stack(key, || self.dispatch_all(key))
    }

    /// Single-service dispatch: scoped bindings (when resolving inside a
    /// scope) shadow singletons, transients come last and are never cached.
    fn dispatch(&self, key: &Key) -> DiResult<AnyArc> {
        let bindings = &self.provider.bindings;

        if let Some(scope) = self.scope {
            if let Some(binding) = bindings.lookup_last(key, Lifetime::Scoped) {
                return scope
                    .instances
                    .fetch_or_activate(binding, self, &self.scoped_lock_held);
            }
        }
        if let Some(binding) = bindings.lookup_last(key, Lifetime::Singleton) {
            return self.provider.singletons.fetch_or_activate(
                binding,
                self,
                &self.singleton_lock_held,
            );
        }
        if let Some(binding) = bindings.lookup_last(key, Lifetime::Transient) {
            return binding.instantiate(self);
        }
        if bindings.contains(key, Lifetime::Scoped) {
            return Err(DiError::WrongLifetime(
                "Cannot resolve scoped service from root provider",
            ));
        }
        Err(DiError::NotFound(key.display_name()))
    }

    /// Get-all dispatch. A key lives in exactly one partition (registration
    /// evicts it from the others), so this enumerates that partition's
    /// bindings in registration order.
    fn dispatch_all(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        let bindings = &self.provider.bindings;

        if let Some(scope) = self.scope {
            if let Some(list) = bindings.lookup_all(key, Lifetime::Scoped) {
                return list
                    .iter()
                    .map(|binding| {
                        scope
                            .instances
                            .fetch_or_activate(binding, self, &self.scoped_lock_held)
                    })
                    .collect();
            }
        }
        if let Some(list) = bindings.lookup_all(key, Lifetime::Singleton) {
            return list
                .iter()
                .map(|binding| {
                    self.provider.singletons.fetch_or_activate(
                        binding,
                        self,
                        &self.singleton_lock_held,
                    )
                })
                .collect();
        }
        if let Some(list) = bindings.lookup_all(key, Lifetime::Transient) {
            return list.iter().map(|binding| binding.instantiate(self)).collect();
        }
        if bindings.contains(key, Lifetime::Scoped) {
            return Err(DiError::WrongLifetime(
                "Cannot resolve scoped service from root provider",
            ));
        }
        Ok(Vec::new())
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(&self, key: &Key) -> DiResult<Arc<dyn Any + Send + Sync>> {
        self.resolve_key(key)
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<Arc<dyn Any + Send + Sync>>> {
        self.resolve_key_all(key)
    }
}

impl Resolver for ResolverContext<'_> {}
