//! # ferrous-support
//!
//! Cross-platform thread synchronization primitives and type-safe dependency
//! injection for Rust.
//!
//! ## Features
//!
//! - **Kernel-level waiting**: Gate, Semaphore and Latch built directly on the
//!   Linux futex syscall, Windows `WaitOnAddress`, or a portable fallback
//! - **Monotonic timed waits**: timeouts that are immune to wall-clock changes
//! - **Type-safe lifetimes**: Singleton, Scoped, and Transient services
//! - **Trait support**: single and multi-binding trait resolution
//! - **Thread-safe**: Arc-based sharing; singletons activate exactly once
//! - **Circular dependency detection**: fails with the full dependency path
//!
//! ## Quick Start: synchronization
//!
//! ```rust
//! use ferrous_support::{Gate, Latch};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let ready = Arc::new(Gate::new(false));
//! let done = Arc::new(Latch::new(2));
//!
//! let workers: Vec<_> = (0..2)
//!     .map(|_| {
//!         let ready = ready.clone();
//!         let done = done.clone();
//!         std::thread::spawn(move || {
//!             ready.wait(); // all workers start together
//!             done.count_down(1);
//!         })
//!     })
//!     .collect();
//!
//! ready.open();
//! assert!(done.wait_for(Duration::from_secs(5)));
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//! ```
//!
//! ## Quick Start: dependency injection
//!
//! ```rust
//! use ferrous_support::{ServiceCollection, Resolver};
//! use std::sync::Arc;
//!
//! // Define your services
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! // Register services
//! let mut services = ServiceCollection::new();
//! services.add_singleton(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//! services.add_transient_factory::<UserService, _>(|resolver| {
//!     UserService {
//!         db: resolver.get_required::<Database>(),
//!     }
//! });
//!
//! // Build and use the service provider
//! let provider = services.build();
//! let user_service = provider.get_required::<UserService>();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: Created once and shared across the entire application
//! - **Scoped**: Created once per scope (ideal for request-like contexts)
//! - **Transient**: Created fresh on every resolution
//!
//! ## Scoped Services
//!
//! ```rust
//! use ferrous_support::{ServiceCollection, Resolver};
//! use std::sync::{Arc, Mutex};
//!
//! struct RequestId(String);
//!
//! let mut services = ServiceCollection::new();
//! let counter = Arc::new(Mutex::new(0));
//! let counter_clone = counter.clone();
//!
//! services.add_scoped_factory::<RequestId, _>(move |_| {
//!     let mut c = counter_clone.lock().unwrap();
//!     *c += 1;
//!     RequestId(format!("req-{}", *c))
//! });
//!
//! let provider = services.build();
//! let scope1 = provider.create_scope();
//! let scope2 = provider.create_scope();
//!
//! let req1 = scope1.get_required::<RequestId>();
//! let req2 = scope2.get_required::<RequestId>();
//! // Different scopes get different instances
//! assert!(!Arc::ptr_eq(&req1, &req2));
//! ```

// Module declarations
pub mod collection;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod platform;
pub mod provider;
pub mod threading;
pub mod traits;

// Internal modules
mod binding;
mod internal;

// Re-export core types
pub use collection::ServiceCollection;
pub use error::{DiError, DiResult};
pub use internal::CircularPanic;
pub use key::{key_of_type, Key};
pub use lifetime::Lifetime;
pub use platform::WakeReason;
pub use provider::{ResolverContext, Scope, ServiceFactory, ServiceProvider};
pub use threading::{Gate, Latch, Semaphore};
pub use traits::{Resolver, ResolverCore};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[test]
    fn test_singleton_resolution() {
        let mut sc = ServiceCollection::new();
        sc.add_singleton(42usize);

        let sp = sc.build();
        let a = sp.get_required::<usize>();
        let b = sp.get_required::<usize>();

        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &b)); // Same instance
    }

    #[test]
    fn test_transient_resolution() {
        let mut sc = ServiceCollection::new();
        let counter = Arc::new(Mutex::new(0));
        let counter_clone = counter.clone();

        sc.add_transient_factory::<String, _>(move |_| {
            let mut c = counter_clone.lock().unwrap();
            *c += 1;
            format!("instance-{}", *c)
        });

        let sp = sc.build();
        let a = sp.get_required::<String>();
        let b = sp.get_required::<String>();

        assert_eq!(a.as_str(), "instance-1");
        assert_eq!(b.as_str(), "instance-2");
        assert!(!Arc::ptr_eq(&a, &b)); // Different instances
    }

    #[test]
    fn test_scoped_resolution() {
        let mut sc = ServiceCollection::new();
        let counter = Arc::new(Mutex::new(0));
        let counter_clone = counter.clone();

        sc.add_scoped_factory::<String, _>(move |_| {
            let mut c = counter_clone.lock().unwrap();
            *c += 1;
            format!("scoped-{}", *c)
        });

        let sp = sc.build();

        // Same scope should have same instance
        let scope1 = sp.create_scope();
        let s1a = scope1.get_required::<String>();
        let s1b = scope1.get_required::<String>();
        assert!(Arc::ptr_eq(&s1a, &s1b));

        // Different scope should have different instance
        let scope2 = sp.create_scope();
        let s2 = scope2.get_required::<String>();
        assert!(!Arc::ptr_eq(&s1a, &s2));
    }

    #[test]
    fn test_trait_resolution() {
        trait TestTrait: Send + Sync {
            fn get_value(&self) -> i32;
        }

        struct TestImpl {
            value: i32,
        }

        impl TestTrait for TestImpl {
            fn get_value(&self) -> i32 {
                self.value
            }
        }

        let mut sc = ServiceCollection::new();
        sc.add_singleton_trait::<dyn TestTrait>(Arc::new(TestImpl { value: 42 }));

        let sp = sc.build();
        let service = sp.get_required_trait::<dyn TestTrait>();
        assert_eq!(service.get_value(), 42);
    }

    #[test]
    fn test_gate_smoke() {
        let gate = Gate::new(true);
        gate.wait(); // open gate lets callers straight through

        gate.close();
        assert!(!gate.wait_for(Duration::from_millis(10)));

        gate.open();
        assert!(gate.wait_for(Duration::from_millis(10)));
    }

    #[test]
    fn test_latch_smoke() {
        let latch = Latch::new(2);
        assert!(!latch.wait_for(Duration::from_millis(10)));

        latch.count_down(1);
        latch.count_down(1);
        latch.wait(); // now open
    }
}
