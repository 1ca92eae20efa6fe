/// Unit tests for DiError and DiResult types
use ferrous_support::{DiError, DiResult};
use std::error::Error;

#[test]
fn test_error_display_not_found() {
    let error = DiError::NotFound("TestService");
    let display_str = format!("{}", error);
    assert_eq!(display_str, "Service not found: TestService");
}

#[test]
fn test_error_display_type_mismatch() {
    let error = DiError::TypeMismatch("std::string::String");
    let display_str = format!("{}", error);
    assert_eq!(display_str, "Type mismatch for: std::string::String");
}

#[test]
fn test_error_display_circular() {
    let path = vec!["ServiceA", "ServiceB", "ServiceA"];
    let error = DiError::Circular(path);
    let display_str = format!("{}", error);
    assert_eq!(
        display_str,
        "Circular dependency: ServiceA -> ServiceB -> ServiceA"
    );
}

#[test]
fn test_error_display_wrong_lifetime() {
    let error = DiError::WrongLifetime("Cannot resolve scoped service from root provider");
    let display_str = format!("{}", error);
    assert_eq!(
        display_str,
        "Lifetime error: Cannot resolve scoped service from root provider"
    );
}

#[test]
fn test_error_implements_std_error() {
    let error: Box<dyn Error> = Box::new(DiError::NotFound("Service"));
    assert!(error.source().is_none());
    assert!(!error.to_string().is_empty());
}

#[test]
fn test_di_result_round_trip() {
    fn succeeds() -> DiResult<u32> {
        Ok(42)
    }
    fn fails() -> DiResult<u32> {
        Err(DiError::NotFound("u32"))
    }

    assert_eq!(succeeds().unwrap(), 42);
    assert!(matches!(fails(), Err(DiError::NotFound("u32"))));
}
