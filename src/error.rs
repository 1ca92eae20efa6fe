//! Error types for the dependency injection container.

use std::fmt;

/// Dependency injection errors
///
/// Represents the error conditions that can occur during service resolution.
/// Registration itself never fails; errors only surface when a service is
/// requested from a [`ServiceProvider`](crate::ServiceProvider), a
/// [`Scope`](crate::Scope), or a resolver context inside a factory.
///
/// Timeouts on the synchronization primitives are not errors; the timed wait
/// operations report them as `bool` returns instead.
///
/// # Examples
///
/// ```rust
/// use ferrous_support::{DiError, ServiceCollection, Resolver};
///
/// let provider = ServiceCollection::new().build();
/// match provider.get::<String>() {
///     Err(DiError::NotFound(type_name)) => {
///         assert_eq!(type_name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// Service not registered
    NotFound(&'static str),
    /// Type downcast failed
    TypeMismatch(&'static str),
    /// Circular dependency detected (includes the full resolution path)
    Circular(Vec<&'static str>),
    /// Invalid lifetime resolution (e.g., scoped from root, or a scope
    /// created during a factory call)
    WrongLifetime(&'static str),
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NotFound(name) => write!(f, "Service not found: {}", name),
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::Circular(path) => {
                write!(f, "Circular dependency: {}", path.join(" -> "))
            }
            DiError::WrongLifetime(msg) => write!(f, "Lifetime error: {}", msg),
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout
/// ferrous-support.
///
/// # Examples
///
/// ```rust
/// use ferrous_support::{DiResult, DiError};
///
/// fn create_service() -> DiResult<String> {
///     Ok("service created".to_string())
/// }
///
/// match create_service() {
///     Ok(service) => println!("Success: {}", service),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub type DiResult<T> = Result<T, DiError>;
