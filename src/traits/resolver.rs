//! Resolver traits for service resolution.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::{key_of_trait, key_of_type, Key};

/// Core resolver trait for object-safe service resolution.
///
/// This trait provides the fundamental, type-erased resolution operations.
/// Cycle detection happens below it: every implementation routes through a
/// resolution context that tracks the keys currently being resolved.
///
/// Most users should use the [`Resolver`] trait instead, which provides more
/// ergonomic generic methods built on top of this trait.
pub trait ResolverCore {
    /// Resolves a single service for a key.
    ///
    /// Returns the most recently registered binding's instance, activated
    /// according to its lifetime, as a type-erased `Arc`.
    fn resolve_any(&self, key: &Key) -> DiResult<Arc<dyn Any + Send + Sync>>;

    /// Resolves all bindings registered for a key, in registration order.
    ///
    /// An unbound key yields an empty vector rather than an error.
    fn resolve_many(&self, key: &Key) -> DiResult<Vec<Arc<dyn Any + Send + Sync>>>;
}

/// High-level resolver interface with generic methods for type-safe service
/// resolution.
///
/// Implemented by [`ServiceProvider`](crate::ServiceProvider),
/// [`Scope`](crate::Scope), and the
/// [`ResolverContext`](crate::ResolverContext) handed to factories, making
/// them interchangeable for service resolution within their respective
/// contexts.
///
/// # Examples
///
/// ```
/// use ferrous_support::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str);
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) {
///         println!("LOG: {}", msg);
///     }
/// }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_singleton(42usize);
/// collection.add_singleton_trait(Arc::new(ConsoleLogger) as Arc<dyn Logger>);
///
/// let provider = collection.build();
///
/// let number = provider.get_required::<usize>();
/// assert_eq!(*number, 42);
///
/// let logger = provider.get_required_trait::<dyn Logger>();
/// logger.log("Service resolved successfully");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete service type.
    ///
    /// Returns the service instance wrapped in an `Arc` for thread-safe
    /// sharing. The service must be registered with the exact type `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_support::{ServiceCollection, Resolver};
    ///
    /// let mut collection = ServiceCollection::new();
    /// collection.add_singleton("configuration".to_string());
    ///
    /// let provider = collection.build();
    /// let config = provider.get::<String>().unwrap();
    /// assert_eq!(&*config, "configuration");
    /// ```
    fn get<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&key_of_type::<T>())?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a single trait implementation.
    ///
    /// Returns the most recently registered implementation for the trait
    /// `T`. For accessing all implementations, use
    /// [`get_all_trait`](Self::get_all_trait).
    fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&key_of_trait::<T>())?;
        // Trait objects are stored as Arc<Arc<dyn Trait>>
        any.downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a concrete service type, or returns `None` when it is not
    /// registered.
    ///
    /// Other resolution failures (circular dependencies, scoped services
    /// requested at root) still surface as errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_support::{ServiceCollection, Resolver};
    ///
    /// let provider = ServiceCollection::new().build();
    /// assert!(provider.try_get::<String>().unwrap().is_none());
    /// ```
    fn try_get<T: 'static + Send + Sync>(&self) -> DiResult<Option<Arc<T>>> {
        match self.get::<T>() {
            Ok(service) => Ok(Some(service)),
            Err(DiError::NotFound(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Resolves a trait implementation, or returns `None` when none is
    /// registered.
    fn try_get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Option<Arc<T>>> {
        match self.get_trait::<T>() {
            Ok(service) => Ok(Some(service)),
            Err(DiError::NotFound(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Resolves every instance registered for the concrete type `T`, in
    /// registration order. An unregistered type yields an empty vector.
    fn get_all<T: 'static + Send + Sync>(&self) -> DiResult<Vec<Arc<T>>> {
        let anys = self.resolve_many(&key_of_type::<T>())?;
        anys.into_iter()
            .map(|any| {
                any.downcast::<T>()
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
            })
            .collect()
    }

    /// Resolves all registered implementations of a trait.
    ///
    /// Returns all implementations registered for trait `T` in the order
    /// they were registered. This is useful for collecting all
    /// implementations of a plugin-style interface.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_support::{ServiceCollection, Resolver, Lifetime};
    /// use std::sync::Arc;
    ///
    /// trait Plugin: Send + Sync {
    ///     fn name(&self) -> &str;
    /// }
    ///
    /// struct PluginA;
    /// impl Plugin for PluginA {
    ///     fn name(&self) -> &str { "Plugin A" }
    /// }
    ///
    /// struct PluginB;
    /// impl Plugin for PluginB {
    ///     fn name(&self) -> &str { "Plugin B" }
    /// }
    ///
    /// let mut collection = ServiceCollection::new();
    /// collection.add_trait_implementation(Arc::new(PluginA) as Arc<dyn Plugin>, Lifetime::Singleton);
    /// collection.add_trait_implementation(Arc::new(PluginB) as Arc<dyn Plugin>, Lifetime::Singleton);
    ///
    /// let provider = collection.build();
    /// let plugins = provider.get_all_trait::<dyn Plugin>().unwrap();
    /// assert_eq!(plugins.len(), 2);
    /// assert_eq!(plugins[0].name(), "Plugin A");
    /// assert_eq!(plugins[1].name(), "Plugin B");
    /// ```
    fn get_all_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Vec<Arc<T>>> {
        let anys = self.resolve_many(&key_of_trait::<T>())?;
        anys.into_iter()
            .map(|any| {
                any.downcast::<Arc<T>>()
                    .map(|boxed| (*boxed).clone())
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
            })
            .collect()
    }

    /// Resolves a concrete service type, panicking on failure.
    ///
    /// Use this when the service is known to be registered and a missing
    /// registration is a configuration bug worth failing fast on.
    ///
    /// # Panics
    ///
    /// Panics if the service cannot be resolved.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_support::{ServiceCollection, Resolver};
    ///
    /// let mut collection = ServiceCollection::new();
    /// collection.add_singleton(42usize);
    ///
    /// let provider = collection.build();
    /// let number = provider.get_required::<usize>();
    /// assert_eq!(*number, 42);
    /// ```
    fn get_required<T: 'static + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>().unwrap_or_else(|e| {
            panic!(
                "Failed to resolve {}: {:?}",
                std::any::type_name::<T>(),
                e
            )
        })
    }

    /// Resolves a trait implementation, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if no implementation can be resolved.
    fn get_required_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Arc<T> {
        self.get_trait::<T>().unwrap_or_else(|e| {
            panic!(
                "Failed to resolve trait {}: {:?}",
                std::any::type_name::<T>(),
                e
            )
        })
    }
}
