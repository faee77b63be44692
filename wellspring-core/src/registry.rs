//! Type-keyed generator registry.
//!
//! The registry is consulted before structural construction, so a caller can
//! override how any type is built, including the leaf kinds. It is built
//! once, before any trial runs, and only read afterwards; trials running on
//! worker threads share it through an `Arc` without synchronization.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::error::Result;
use crate::source::Source;

pub(crate) type BoxedGenerator =
    Box<dyn Fn(&mut Source) -> Result<Box<dyn Any>> + Send + Sync>;

/// Immutable mapping from target type to generator function.
#[derive(Default)]
pub struct GeneratorRegistry {
    entries: HashMap<TypeId, BoxedGenerator>,
}

impl GeneratorRegistry {
    pub fn builder() -> GeneratorRegistryBuilder {
        GeneratorRegistryBuilder {
            entries: HashMap::new(),
        }
    }

    /// An empty registry; every type-directed request falls through to the
    /// structural path.
    pub fn empty() -> Self {
        GeneratorRegistry::default()
    }

    pub(crate) fn lookup(&self, id: TypeId) -> Option<&BoxedGenerator> {
        self.entries.get(&id)
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`GeneratorRegistry`]. Registering the same type twice keeps
/// the later registration.
pub struct GeneratorRegistryBuilder {
    entries: HashMap<TypeId, BoxedGenerator>,
}

impl GeneratorRegistryBuilder {
    /// Register a generator function for `T`.
    pub fn register<T, F>(mut self, generator: F) -> Self
    where
        T: Any,
        F: Fn(&mut Source) -> Result<T> + Send + Sync + 'static,
    {
        self.entries.insert(
            TypeId::of::<T>(),
            Box::new(move |source| generator(source).map(|value| Box::new(value) as Box<dyn Any>)),
        );
        self
    }

    pub fn build(self) -> GeneratorRegistry {
        GeneratorRegistry {
            entries: self.entries,
        }
    }
}
