/// Unit tests for Key type methods
use ferrous_support::{key_of_type, Key};
use std::any::TypeId;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of(key: &Key) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_key_display_name_type() {
    let key = Key::Type(TypeId::of::<String>(), "alloc::string::String");
    assert_eq!(key.display_name(), "alloc::string::String");
}

#[test]
fn test_key_display_name_trait() {
    let key = Key::Trait("dyn core::fmt::Debug");
    assert_eq!(key.display_name(), "dyn core::fmt::Debug");
}

#[test]
fn test_type_keys_compare_by_type_id_only() {
    // The name string is diagnostics; equality rides on the TypeId
    let a = Key::Type(TypeId::of::<u32>(), "u32");
    let b = Key::Type(TypeId::of::<u32>(), "some::alias::U32");
    let c = Key::Type(TypeId::of::<u64>(), "u32");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn test_type_and_trait_keys_never_collide() {
    let type_key = Key::Type(TypeId::of::<String>(), "x");
    let trait_key = Key::Trait("x");
    assert_ne!(type_key, trait_key);
}

#[test]
fn test_key_of_type_helper() {
    let key = key_of_type::<Vec<u8>>();
    match key {
        Key::Type(id, name) => {
            assert_eq!(id, TypeId::of::<Vec<u8>>());
            assert!(name.contains("Vec"));
        }
        other => panic!("expected a type key, got {:?}", other),
    }
}
