//! Service key types for the dependency injection container.

use std::any::TypeId;

/// Key for service storage and lookup.
///
/// Keys uniquely identify services in the container. A key is the only thing
/// a binding is looked up by: concrete types are keyed by their `TypeId`,
/// trait objects by their stable type name. Multiple bindings may share one
/// key (for `get_all` queries); multiplicity lives in the binding lists, not
/// in the key itself.
///
/// # Examples
///
/// ```rust
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
/// let mut services = ServiceCollection::new();
/// services.add_singleton(8080u32);
/// services.add_singleton_trait(Arc::new(ConsoleLogger) as Arc<dyn Logger>);
///
/// let provider = services.build();
///
/// // Resolution uses keys internally
/// let port = provider.get_required::<u32>(); // Type key
/// let logger = provider.get_required_trait::<dyn Logger>(); // Trait key
///
/// assert_eq!(*port, 8080);
/// logger.log("Service resolution successful");
/// ```
#[derive(Debug, Clone)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    ///
    /// Used for registering and resolving concrete types like `String`,
    /// `Database`, custom structs, etc. The TypeId provides fast lookup
    /// while the name helps with debugging.
    Type(TypeId, &'static str),
    /// Trait binding key
    ///
    /// Used for registering and resolving trait objects like `dyn Logger`.
    /// Only stores the trait name since traits don't have TypeId.
    Trait(&'static str),
}

impl Key {
    /// Get the type or trait name for display
    ///
    /// Returns the human-readable type or trait name for debugging and
    /// error messages. This is the `std::any::type_name` result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_support::Key;
    /// use std::any::TypeId;
    ///
    /// let type_key = Key::Type(TypeId::of::<String>(), "alloc::string::String");
    /// assert_eq!(type_key.display_name(), "alloc::string::String");
    ///
    /// let trait_key = Key::Trait("dyn core::fmt::Debug");
    /// assert_eq!(trait_key.display_name(), "dyn core::fmt::Debug");
    /// ```
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Trait(name) => name,
        }
    }
}

// TypeId-only comparison for concrete types; the name string is diagnostics.
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Trait(a), Key::Trait(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state); // Discriminant
                id.hash(state);
            }
            Key::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

/// Builds the lookup key for a concrete service type.
#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Builds the lookup key for a trait object service.
#[inline(always)]
pub(crate) fn key_of_trait<T: ?Sized + 'static>() -> Key {
    Key::Trait(std::any::type_name::<T>())
}
