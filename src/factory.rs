use std::collections::HashMap;
use std::fmt;

use crate::ConstructorFunction;

/// A registry of named constructors for `T`.
///
/// Conversion code asks the registry for a fresh instance instead of constructing the concrete type itself, so an
/// application can substitute its own defaults (a different `object_type`, pre-filled fields) without touching the
/// conversion code. Lookups by tag serve callers that build specific variants.
///
/// ```
/// use cart_reconcile::factory::TypeRegistry;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Parcel {
///     kind: String,
/// }
///
/// let mut registry: TypeRegistry<Parcel> = TypeRegistry::default();
/// registry.register("Express", || Parcel { kind: "Express".to_string() });
///
/// assert_eq!(registry.create_default(), Parcel::default());
/// assert_eq!(registry.create("Express").unwrap().kind, "Express");
/// assert!(registry.create("Freight").is_none());
/// ```
pub struct TypeRegistry<'a, T> {
    default: ConstructorFunction<'a, T>,
    constructors: HashMap<String, ConstructorFunction<'a, T>>,
}

impl<'a, T> TypeRegistry<'a, T> {
    /// Creates a registry whose default constructor is `default`.
    #[cfg(not(feature = "not-send-futures"))]
    pub fn new<F>(default: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'a,
    {
        TypeRegistry {
            default: std::sync::Arc::new(default),
            constructors: HashMap::new(),
        }
    }

    /// Creates a registry whose default constructor is `default`.
    #[cfg(feature = "not-send-futures")]
    pub fn new<F>(default: F) -> Self
    where
        F: Fn() -> T + 'a,
    {
        TypeRegistry {
            default: std::rc::Rc::new(default),
            constructors: HashMap::new(),
        }
    }

    /// Registers a constructor under `tag`, returning the one it replaced.
    #[cfg(not(feature = "not-send-futures"))]
    pub fn register<F>(
        &mut self,
        tag: impl Into<String>,
        constructor: F,
    ) -> Option<ConstructorFunction<'a, T>>
    where
        F: Fn() -> T + Send + Sync + 'a,
    {
        self.constructors
            .insert(tag.into(), std::sync::Arc::new(constructor))
    }

    /// Registers a constructor under `tag`, returning the one it replaced.
    #[cfg(feature = "not-send-futures")]
    pub fn register<F>(
        &mut self,
        tag: impl Into<String>,
        constructor: F,
    ) -> Option<ConstructorFunction<'a, T>>
    where
        F: Fn() -> T + 'a,
    {
        self.constructors
            .insert(tag.into(), std::rc::Rc::new(constructor))
    }

    /// Makes the constructor registered under `tag` the default one.
    /// Returns `false` (and changes nothing) if `tag` is unknown.
    pub fn promote(&mut self, tag: &str) -> bool {
        match self.constructors.get(tag) {
            Some(constructor) => {
                self.default = constructor.clone();
                true
            }
            None => false,
        }
    }

    /// Builds an instance with the default constructor.
    pub fn create_default(&self) -> T {
        (self.default)()
    }

    /// Builds an instance with the constructor registered under `tag`.
    pub fn create(&self, tag: &str) -> Option<T> {
        self.constructors.get(tag).map(|constructor| constructor())
    }

    /// Builds an instance with the constructor registered under `tag`, falling back to the default one.
    pub fn create_or_default(&self, tag: &str) -> T {
        self.create(tag).unwrap_or_else(|| self.create_default())
    }

    /// `true` if a constructor is registered under `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }
}

impl<'a, T: Default + 'a> Default for TypeRegistry<'a, T> {
    fn default() -> Self {
        TypeRegistry::new(T::default)
    }
}

impl<T> Clone for TypeRegistry<'_, T> {
    fn clone(&self) -> Self {
        TypeRegistry {
            default: self.default.clone(),
            constructors: self.constructors.clone(),
        }
    }
}

impl<T> fmt::Debug for TypeRegistry<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&String> = self.constructors.keys().collect();
        tags.sort();
        f.debug_struct("TypeRegistry").field("tags", &tags).finish()
    }
}
