//! Scoped service resolution.
//!
//! This module contains the Scope type for resolving request-scoped
//! services layered over a root provider's singletons.

use std::any::Any;
use std::sync::Arc;

use crate::error::DiResult;
use crate::internal::with_circular_catch;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::traits::{Resolver, ResolverCore};

use super::instances::InstanceSet;
use super::{ResolverContext, ServiceFactory, ServiceProvider};

/// Scoped service container for request-scoped dependency resolution.
///
/// A `Scope` provides isolated resolution for scoped services while still
/// accessing singleton services from the root provider. This is ideal for
/// request-like contexts where services (a database transaction, a user
/// context) should be shared within one unit of work but isolated between
/// units.
///
/// # Lifetime Behavior
///
/// - **Singleton**: resolved into the root provider, shared across scopes
/// - **Scoped**: resolved into this scope's own instances
/// - **Transient**: created fresh on every resolution
///
/// The scope holds the root provider alive; dropping the scope tears down
/// its scoped instances in reverse activation-slot order and leaves the
/// provider untouched.
///
/// # Examples
///
/// ```
/// use ferrous_support::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct DatabaseConnection(String);
///
/// #[derive(Debug)]
/// struct UserService {
///     db: Arc<DatabaseConnection>,
/// }
///
/// let mut collection = ServiceCollection::new();
///
/// collection.add_scoped_factory::<DatabaseConnection, _>(|_| {
///     DatabaseConnection("connection-123".to_string())
/// });
/// collection.add_transient_factory::<UserService, _>(|resolver| {
///     UserService {
///         db: resolver.get_required::<DatabaseConnection>(),
///     }
/// });
///
/// let provider = collection.build();
/// let scope = provider.create_scope();
///
/// // Services resolved in the same scope share the same DB connection
/// let user1 = scope.get_required::<UserService>();
/// let user2 = scope.get_required::<UserService>();
/// assert!(Arc::ptr_eq(&user1.db, &user2.db));
/// ```
pub struct Scope {
    // Scoped instances drop before the root that owns their bindings.
    inner: ScopeInner,
    root: ServiceProvider,
}

pub(crate) struct ScopeInner {
    pub(crate) instances: InstanceSet,
}

impl Scope {
    pub(crate) fn new(root: ServiceProvider) -> Self {
        let instances = InstanceSet::for_partition(&root.inner().bindings, Lifetime::Scoped);
        Self {
            root,
            inner: ScopeInner { instances },
        }
    }

    /// Creates a sibling scope with fresh scoped instances, sharing this
    /// scope's root provider and its singletons.
    pub fn create_scope(&self) -> Scope {
        self.root.create_scope()
    }

    /// Returns a handle producing instances of `T` on demand; see
    /// [`ServiceProvider::get_service_factory`]. The handle resolves
    /// through the root provider, not through this scope.
    pub fn get_service_factory<T: 'static + Send + Sync>(
        &self,
    ) -> DiResult<ServiceFactory<T>> {
        self.root.get_service_factory::<T>()
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, key: &Key) -> DiResult<Arc<dyn Any + Send + Sync>> {
        with_circular_catch(|| {
            ResolverContext::for_scope(self.root.inner(), &self.inner).resolve_key(key)
        })
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<Arc<dyn Any + Send + Sync>>> {
        with_circular_catch(|| {
            ResolverContext::for_scope(self.root.inner(), &self.inner).resolve_key_all(key)
        })
    }
}

impl Resolver for Scope {}
