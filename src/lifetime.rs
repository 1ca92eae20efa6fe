//! Service lifetime definitions.

/// Service lifetimes controlling instance caching behavior
///
/// Defines how service instances are created, cached, and shared within
/// the dependency injection container.
///
/// # Lifetime Characteristics
///
/// - **Singleton**: one instance per root provider, shared everywhere
/// - **Scoped**: one instance per scope
/// - **Transient**: a fresh instance on every resolution
///
/// # Examples
///
/// ```rust
/// use ferrous_support::{ServiceCollection, Resolver};
///
/// struct Database { url: String }
/// struct Repository { db_url: String }
///
/// let mut services = ServiceCollection::new();
///
/// // Singleton: one instance for the entire application
/// services.add_singleton(Database {
///     url: "postgres://localhost".to_string()
/// });
///
/// // Scoped: one instance per scope
/// services.add_scoped_factory::<Repository, _>(|r| {
///     let db = r.get_required::<Database>();
///     Repository { db_url: db.url.clone() }
/// });
///
/// let provider = services.build();
///
/// let db1 = provider.get_required::<Database>();
/// let scope = provider.create_scope();
/// let db2 = scope.get_required::<Database>();
/// assert!(std::ptr::eq(&*db1, &*db2)); // Same instance
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Single instance per root provider, cached forever
    ///
    /// Singleton services are created once when first requested and then
    /// cached in the root provider. The same instance is shared across
    /// all scopes and threads; concurrent first requests activate the
    /// service exactly once.
    Singleton,
    /// Single instance per scope, cached for the scope lifetime
    ///
    /// Scoped services are created once per scope when first requested
    /// within that scope. Different scopes get different instances.
    /// Requesting a scoped service from the root provider is an error.
    Scoped,
    /// New instance per resolution, never cached
    ///
    /// Transient services produce a fresh instance every time they are
    /// requested, either by invoking their factory or by cloning their
    /// registered prototype.
    Transient,
}
