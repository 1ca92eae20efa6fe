//! Service collection module for dependency injection.
//!
//! This module contains the ServiceCollection type for registering services
//! and building service providers.

use std::sync::Arc;

use crate::binding::{AnyArc, BindingSet, CloneFn, Constructor, FactoryFn};
use crate::error::{DiError, DiResult};
use crate::key::{key_of_trait, key_of_type, Key};
use crate::lifetime::Lifetime;
use crate::provider::{ResolverContext, ServiceProvider};

/// Mutable registry of service bindings.
///
/// Services are registered against their concrete type or a trait object,
/// under one of three [`Lifetime`]s, and materialize either through a
/// factory closure, by cloning a registered prototype value, or through
/// their `Default` implementation. Registering a type again under a
/// different lifetime moves it: only the most recent lifetime wins per type.
///
/// Once every binding is in place, [`build`](ServiceCollection::build)
/// consumes the collection and produces an immutable
/// [`ServiceProvider`].
///
/// # Examples
///
/// ```rust
/// use ferrous_support::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { connection_string: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database {
///     connection_string: "postgres://localhost".to_string(),
/// });
/// services.add_transient_factory::<UserService, _>(|resolver| {
///     UserService {
///         db: resolver.get_required::<Database>(),
///     }
/// });
///
/// let provider = services.build();
/// let user_service = provider.get_required::<UserService>();
/// assert_eq!(user_service.db.connection_string, "postgres://localhost");
/// ```
pub struct ServiceCollection {
    bindings: BindingSet,
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self {
            bindings: BindingSet::new(),
        }
    }

    // ----- Concrete Type Registrations -----

    /// Registers a singleton instance that will be shared across the entire
    /// application.
    ///
    /// The instance is wrapped in an `Arc` immediately; all requests for
    /// this service type return that same instance.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_support::ServiceCollection;
    /// struct Config {
    ///     database_url: String,
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(Config {
    ///     database_url: "postgres://localhost".to_string(),
    /// });
    /// ```
    pub fn add_singleton<T: 'static + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.add_provided_instance(key_of_type::<T>(), Lifetime::Singleton, Arc::new(value))
    }

    /// Registers a singleton factory that creates the instance on first
    /// request.
    ///
    /// The factory is called at most once; concurrent first requests are
    /// serialized and every caller receives the same cached instance. The
    /// factory receives a [`ResolverContext`] to resolve its dependencies.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_support::{ServiceCollection, Resolver};
    /// # use std::sync::Arc;
    /// struct Database { url: String }
    /// struct UserService { db: Arc<Database> }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(Database { url: "postgres://localhost".to_string() });
    /// services.add_singleton_factory::<UserService, _>(|resolver| {
    ///     UserService {
    ///         db: resolver.get_required::<Database>(),
    ///     }
    /// });
    /// ```
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Singleton, factory)
    }

    /// Registers a scoped factory that creates one instance per scope.
    ///
    /// Each scope gets its own instance; within a scope, the same instance
    /// is reused. Resolving a scoped service from the root provider is an
    /// error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_support::{ServiceCollection, Resolver};
    /// struct RequestContext { request_id: String }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_scoped_factory::<RequestContext, _>(|_| {
    ///     RequestContext { request_id: "req-123".to_string() }
    /// });
    /// ```
    pub fn add_scoped_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Scoped, factory)
    }

    /// Registers a transient factory that creates a new instance on every
    /// request.
    ///
    /// No caching is performed; the factory runs every time this service is
    /// resolved, even within the same scope.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_support::{ServiceCollection, Resolver};
    /// struct Message { body: String }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_transient_factory::<Message, _>(|_| {
    ///     Message { body: String::new() }
    /// });
    /// ```
    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Transient, factory)
    }

    // ----- Default-Constructed Registrations -----

    /// Registers a singleton built from `T::default()` on first request.
    pub fn add_singleton_default<T: Default + 'static + Send + Sync>(&mut self) -> &mut Self {
        self.add_factory(Lifetime::Singleton, |_| T::default())
    }

    /// Registers a scoped service built from `T::default()` once per scope.
    pub fn add_scoped_default<T: Default + 'static + Send + Sync>(&mut self) -> &mut Self {
        self.add_factory(Lifetime::Scoped, |_| T::default())
    }

    /// Registers a transient service built from `T::default()` per request.
    pub fn add_transient_default<T: Default + 'static + Send + Sync>(&mut self) -> &mut Self {
        self.add_factory(Lifetime::Transient, |_| T::default())
    }

    // ----- Prototype Registrations -----

    /// Registers a scoped service produced by cloning `prototype` once per
    /// scope.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_support::{ServiceCollection, Resolver};
    /// #[derive(Clone)]
    /// struct Settings { retries: u32 }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_scoped_prototype(Settings { retries: 3 });
    ///
    /// let provider = services.build();
    /// let scope = provider.create_scope();
    /// assert_eq!(scope.get_required::<Settings>().retries, 3);
    /// ```
    pub fn add_scoped_prototype<T>(&mut self, prototype: T) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.add_prototype(Lifetime::Scoped, prototype)
    }

    /// Registers a transient service produced by cloning `prototype` on
    /// every request.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_support::{ServiceCollection, Resolver};
    /// # use std::sync::Arc;
    /// #[derive(Clone)]
    /// struct Template { subject: String }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_transient_prototype(Template { subject: "Welcome".to_string() });
    ///
    /// let provider = services.build();
    /// let a = provider.get_required::<Template>();
    /// let b = provider.get_required::<Template>();
    /// assert!(!Arc::ptr_eq(&a, &b)); // fresh clone per request
    /// ```
    pub fn add_transient_prototype<T>(&mut self, prototype: T) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.add_prototype(Lifetime::Transient, prototype)
    }

    // ----- Trait Registrations -----

    /// Registers a singleton trait implementation shared across the entire
    /// application.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_support::{ServiceCollection, Resolver};
    /// # use std::sync::Arc;
    /// trait Logger: Send + Sync {
    ///     fn log(&self, message: &str);
    /// }
    ///
    /// struct ConsoleLogger;
    /// impl Logger for ConsoleLogger {
    ///     fn log(&self, message: &str) {
    ///         println!("[LOG] {}", message);
    ///     }
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton_trait::<dyn Logger>(Arc::new(ConsoleLogger));
    ///
    /// let provider = services.build();
    /// provider.get_required_trait::<dyn Logger>().log("ready");
    /// ```
    pub fn add_singleton_trait<T: ?Sized + 'static + Send + Sync>(
        &mut self,
        value: Arc<T>,
    ) -> &mut Self {
        self.add_trait_implementation(value, Lifetime::Singleton)
    }

    /// Registers a trait implementation under the given lifetime.
    ///
    /// Repeated registrations for the same trait accumulate; single
    /// resolution returns the most recent one and
    /// [`get_all_trait`](crate::Resolver::get_all_trait) returns all of
    /// them in registration order.
    pub fn add_trait_implementation<T: ?Sized + 'static + Send + Sync>(
        &mut self,
        value: Arc<T>,
        lifetime: Lifetime,
    ) -> &mut Self {
        // Trait objects are stored as Arc<Arc<dyn Trait>>; handing out the
        // provided instance is an Arc clone regardless of lifetime.
        self.add_provided_instance(key_of_trait::<T>(), lifetime, Arc::new(value))
    }

    /// Registers a singleton factory for a trait implementation.
    pub fn add_singleton_trait_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<T> + Send + Sync + 'static,
    {
        self.add_trait_factory(Lifetime::Singleton, factory)
    }

    /// Registers a scoped factory for a trait implementation.
    pub fn add_scoped_trait_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<T> + Send + Sync + 'static,
    {
        self.add_trait_factory(Lifetime::Scoped, factory)
    }

    /// Registers a transient factory for a trait implementation.
    pub fn add_transient_trait_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<T> + Send + Sync + 'static,
    {
        self.add_trait_factory(Lifetime::Transient, factory)
    }

    // ----- Removal and Introspection -----

    /// Removes every binding registered for the concrete type `T`, in all
    /// lifetimes, returning how many were removed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_support::ServiceCollection;
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(1usize);
    /// services.add_singleton(2usize);
    ///
    /// assert_eq!(services.remove_all::<usize>(), 2);
    /// assert!(services.is_empty());
    /// ```
    pub fn remove_all<T: 'static>(&mut self) -> usize {
        self.bindings.remove_all(&key_of_type::<T>())
    }

    /// Removes every binding registered for the trait `T`, returning how
    /// many were removed.
    pub fn remove_all_trait<T: ?Sized + 'static>(&mut self) -> usize {
        self.bindings.remove_all(&key_of_trait::<T>())
    }

    /// Number of registered bindings across all lifetimes.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no bindings have been registered.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    // ----- Building -----

    /// Builds the service provider, consuming this collection.
    ///
    /// Assigns every binding its instance-slot index and freezes the
    /// binding set; from here on it is shared read-only between the
    /// provider and all scopes.
    pub fn build(mut self) -> ServiceProvider {
        self.bindings.assign_unique_indices();
        ServiceProvider::new(Arc::new(self.bindings))
    }

    // ----- Internal Helpers -----

    fn add_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        let ctor: FactoryFn = Arc::new(move |resolver: &ResolverContext| -> DiResult<AnyArc> {
            Ok(Arc::new(factory(resolver)) as AnyArc)
        });
        self.bindings
            .add(key_of_type::<T>(), lifetime, Constructor::Factory(ctor));
        self
    }

    fn add_trait_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<T> + Send + Sync + 'static,
    {
        let ctor: FactoryFn = Arc::new(move |resolver: &ResolverContext| -> DiResult<AnyArc> {
            Ok(Arc::new(factory(resolver)) as AnyArc)
        });
        self.bindings
            .add(key_of_trait::<T>(), lifetime, Constructor::Factory(ctor));
        self
    }

    fn add_prototype<T>(&mut self, lifetime: Lifetime, prototype: T) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let clone_factory: CloneFn = Arc::new(|prototype: &AnyArc| -> DiResult<AnyArc> {
            match prototype.downcast_ref::<T>() {
                Some(value) => Ok(Arc::new(value.clone()) as AnyArc),
                None => Err(DiError::TypeMismatch(std::any::type_name::<T>())),
            }
        });
        self.bindings.add(
            key_of_type::<T>(),
            lifetime,
            Constructor::Prototype {
                prototype: Arc::new(prototype),
                clone_factory,
            },
        );
        self
    }

    /// A user-provided instance is a prototype whose clone factory is an
    /// `Arc` clone, so every activation hands out the same instance.
    fn add_provided_instance(&mut self, key: Key, lifetime: Lifetime, instance: AnyArc) -> &mut Self {
        let clone_factory: CloneFn =
            Arc::new(|prototype: &AnyArc| -> DiResult<AnyArc> { Ok(prototype.clone()) });
        self.bindings.add(
            key,
            lifetime,
            Constructor::Prototype {
                prototype: instance,
                clone_factory,
            },
        );
        self
    }
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}
