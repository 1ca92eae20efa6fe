//! Service provider module for dependency injection.
//!
//! This module contains the ServiceProvider type and related functionality
//! for resolving registered services from the DI container.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::binding::BindingSet;
use crate::error::{DiError, DiResult};
use crate::internal::with_circular_catch;
use crate::key::{key_of_type, Key};
use crate::lifetime::Lifetime;
use crate::traits::{Resolver, ResolverCore};

pub mod context;
pub mod scope;

pub(crate) mod instances;

pub use context::ResolverContext;
pub use scope::Scope;

use instances::InstanceSet;

/// Service provider for resolving dependencies from the DI container.
///
/// The `ServiceProvider` is built from a
/// [`ServiceCollection`](crate::ServiceCollection) and resolves services
/// according to their registered lifetimes. It owns the singleton instances;
/// scoped services are resolved through a [`Scope`] created with
/// [`create_scope`](ServiceProvider::create_scope).
///
/// # Thread Safety
///
/// ServiceProvider is fully thread-safe and can be shared across threads.
/// It clones cheaply (it uses `Arc` internally), and a singleton binding
/// activates exactly once no matter how many threads race to resolve it:
/// activation is serialized by a per-provider change mutex, and an
/// activated instance is published with release ordering so every observer
/// sees it fully constructed.
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
/// let mut collection = ServiceCollection::new();
/// collection.add_singleton(Database { url: "postgres://localhost".to_string() });
/// collection.add_transient_factory::<UserService, _>(|resolver| {
///     UserService { db: resolver.get_required::<Database>() }
/// });
///
/// let provider = collection.build();
/// let user_service = provider.get_required::<UserService>();
/// assert_eq!(user_service.db.url, "postgres://localhost");
/// ```
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    // Instances drop before the bindings they were produced from.
    pub(crate) singletons: InstanceSet,
    pub(crate) bindings: Arc<BindingSet>,
}

impl ServiceProvider {
    pub(crate) fn new(bindings: Arc<BindingSet>) -> Self {
        let singletons = InstanceSet::for_partition(&bindings, Lifetime::Singleton);
        Self {
            inner: Arc::new(ProviderInner {
                bindings,
                singletons,
            }),
        }
    }

    /// Convenience accessor for the inner provider
    #[inline]
    pub(crate) fn inner(&self) -> &ProviderInner {
        &self.inner
    }

    /// Creates a new scope for resolving scoped services.
    ///
    /// Scoped services are cached per scope. Each scope maintains its own
    /// instances while still sharing the singleton instances of this
    /// provider; the scope keeps the provider alive for as long as it
    /// exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_support::{ServiceCollection, Resolver};
    /// use std::sync::{Arc, Mutex};
    ///
    /// #[derive(Debug)]
    /// struct RequestId(String);
    ///
    /// let mut collection = ServiceCollection::new();
    /// let counter = Arc::new(Mutex::new(0));
    /// let counter_clone = counter.clone();
    ///
    /// collection.add_scoped_factory::<RequestId, _>(move |_| {
    ///     let mut c = counter_clone.lock().unwrap();
    ///     *c += 1;
    ///     RequestId(format!("req-{}", *c))
    /// });
    ///
    /// let provider = collection.build();
    ///
    /// let scope1 = provider.create_scope();
    /// let scope2 = provider.create_scope();
    ///
    /// let req1a = scope1.get_required::<RequestId>();
    /// let req1b = scope1.get_required::<RequestId>(); // Same instance
    /// let req2 = scope2.get_required::<RequestId>(); // Different instance
    ///
    /// assert!(Arc::ptr_eq(&req1a, &req1b));
    /// assert!(!Arc::ptr_eq(&req1a, &req2));
    /// ```
    pub fn create_scope(&self) -> Scope {
        Scope::new(self.clone())
    }

    /// Returns a handle that produces an instance of `T` on demand.
    ///
    /// The handle captures this provider, so it can be stored inside another
    /// service and invoked long after the resolution that created it. Fails
    /// immediately if `T` has no binding at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_support::{ServiceCollection, Resolver};
    ///
    /// #[derive(Default)]
    /// struct Connection;
    ///
    /// let mut collection = ServiceCollection::new();
    /// collection.add_transient_default::<Connection>();
    ///
    /// let provider = collection.build();
    /// let factory = provider.get_service_factory::<Connection>().unwrap();
    ///
    /// let a = factory.create().unwrap();
    /// let b = factory.create().unwrap();
    /// assert!(!std::sync::Arc::ptr_eq(&a, &b));
    /// ```
    pub fn get_service_factory<T: 'static + Send + Sync>(
        &self,
    ) -> DiResult<ServiceFactory<T>> {
        let key = key_of_type::<T>();
        let registered = [Lifetime::Singleton, Lifetime::Scoped, Lifetime::Transient]
            .into_iter()
            .any(|lifetime| self.inner.bindings.contains(&key, lifetime));
        if !registered {
            return Err(DiError::NotFound(std::any::type_name::<T>()));
        }
        Ok(ServiceFactory {
            provider: self.clone(),
            _marker: PhantomData,
        })
    }
}

impl Clone for ServiceProvider {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(&self, key: &Key) -> DiResult<Arc<dyn Any + Send + Sync>> {
        with_circular_catch(|| ResolverContext::for_provider(&self.inner).resolve_key(key))
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<Arc<dyn Any + Send + Sync>>> {
        with_circular_catch(|| ResolverContext::for_provider(&self.inner).resolve_key_all(key))
    }
}

impl Resolver for ServiceProvider {}

/// A callable producing instances of one service on demand.
///
/// Obtained from
/// [`get_service_factory`](ServiceProvider::get_service_factory); used to
/// inject "factory of T" dependencies. Resolution goes through the root
/// provider, so requesting a scoped-only service through a factory handle
/// fails the same way root resolution does.
pub struct ServiceFactory<T> {
    provider: ServiceProvider,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static + Send + Sync> ServiceFactory<T> {
    /// Produces an instance of the service, honoring its registered
    /// lifetime (a transient binding yields a fresh instance per call).
    pub fn create(&self) -> DiResult<Arc<T>> {
        self.provider.get::<T>()
    }
}

impl<T> Clone for ServiceFactory<T> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            _marker: PhantomData,
        }
    }
}
