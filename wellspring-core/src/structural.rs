//! Structural construction of arbitrary nominal types.
//!
//! Rust has no runtime constructor introspection, so structural generation is
//! descriptor-driven: each buildable type registers one or more
//! [`ConstructorDescriptor`]s, each an ordered list of parameter type keys
//! plus a factory that assembles the value from generated arguments. Generic
//! parameters resolve at registration time: registering `Wrapper<String>`
//! registers descriptors whose parameter keys already name `Option<String>`,
//! `Vec<String>` and so on, which is the type-descriptor substitution the
//! engine needs in place of runtime generics.
//!
//! Descriptor selection prefers the constructor with the most parameters the
//! engine can satisfy, falling back through smaller ones; ties between equal
//! parameter counts keep declaration order. Selection depends only on the
//! registries, never on drawn bits, so it is deterministic for a given setup.

use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::error::{Result, SourceError};
use crate::source::Source;

/// Identity of a target or parameter type: its `TypeId` plus a name kept for
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: Any>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Generated constructor arguments, consumed in declaration order by a
/// descriptor's factory.
pub struct ArgList {
    args: std::vec::IntoIter<Box<dyn Any>>,
}

impl ArgList {
    pub(crate) fn new(args: Vec<Box<dyn Any>>) -> Self {
        ArgList {
            args: args.into_iter(),
        }
    }

    /// Take the next argument, downcast to its declared type. A mismatch
    /// means the factory and the descriptor's parameter list disagree.
    pub fn take<T: Any>(&mut self) -> Result<T> {
        let boxed = self.args.next().ok_or_else(|| mismatch::<T>("exhausted"))?;
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| mismatch::<T>("mistyped"))
    }
}

fn mismatch<T>(kind: &str) -> SourceError {
    SourceError::ReflectiveConstruction {
        type_name: type_name::<T>(),
        param: None,
        message: format!("factory argument list {kind}: parameter list and factory disagree"),
    }
}

type Factory = Box<dyn Fn(ArgList) -> Result<Box<dyn Any>> + Send + Sync>;

/// One way to build a type: parameter types to generate, in order, and a
/// factory to combine them.
pub struct ConstructorDescriptor {
    params: Vec<TypeKey>,
    factory: Factory,
}

impl ConstructorDescriptor {
    pub fn new<F>(params: Vec<TypeKey>, factory: F) -> Self
    where
        F: Fn(ArgList) -> Result<Box<dyn Any>> + Send + Sync + 'static,
    {
        ConstructorDescriptor {
            params,
            factory: Box::new(factory),
        }
    }

    pub fn params(&self) -> &[TypeKey] {
        &self.params
    }

    pub(crate) fn invoke(&self, args: ArgList) -> Result<Box<dyn Any>> {
        (self.factory)(args)
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Generator closure for types built without constructor selection: enum
/// variant draws and container instantiations.
pub type ClosedGenerator =
    Box<dyn Fn(&mut Source) -> Result<Box<dyn Any>> + Send + Sync>;

/// How a registered type gets built.
pub enum Construction {
    /// Candidate constructors, in declaration order.
    Descriptors(Vec<ConstructorDescriptor>),
    /// A closed generator that handles the whole value itself.
    Closed(ClosedGenerator),
}

/// Implemented (usually via `#[derive(Structural)]`) by types that describe
/// their own construction.
pub trait Structural: Any + Sized {
    fn construction() -> Construction;
}

/// Immutable mapping from target type to its construction strategy. Built
/// once before any trial and shared read-only across trials.
#[derive(Default)]
pub struct StructuralRegistry {
    entries: HashMap<TypeId, Construction>,
}

impl StructuralRegistry {
    pub fn builder() -> StructuralRegistryBuilder {
        StructuralRegistryBuilder {
            entries: HashMap::new(),
        }
    }

    /// An empty registry; only leaf kinds and registered generators resolve.
    pub fn empty() -> Self {
        StructuralRegistry::default()
    }

    pub(crate) fn lookup(&self, id: TypeId) -> Option<&Construction> {
        self.entries.get(&id)
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }
}

/// Builder for [`StructuralRegistry`]. As with generators, registering the
/// same type twice keeps the later registration.
pub struct StructuralRegistryBuilder {
    entries: HashMap<TypeId, Construction>,
}

impl StructuralRegistryBuilder {
    /// Register explicit constructor descriptors for `T`, in declaration
    /// order.
    pub fn register<T: Any>(mut self, descriptors: Vec<ConstructorDescriptor>) -> Self {
        self.entries
            .insert(TypeId::of::<T>(), Construction::Descriptors(descriptors));
        self
    }

    /// Register a type that describes its own construction.
    pub fn structural<T: Structural>(mut self) -> Self {
        self.entries.insert(TypeId::of::<T>(), T::construction());
        self
    }

    /// Register an enum-like type as a uniform draw over its declared
    /// variants.
    pub fn variants<T>(mut self, variants: Vec<T>) -> Self
    where
        T: Any + Clone + fmt::Debug + Send + Sync,
    {
        self.entries.insert(
            TypeId::of::<T>(),
            Construction::Closed(Box::new(move |source| {
                let value = source.from(&variants)?;
                Ok(Box::new(value) as Box<dyn Any>)
            })),
        );
        self
    }

    /// Register `Option<T>` to nullably defer to `T`'s own generation path.
    pub fn option_of<T: Any>(mut self) -> Self {
        self.entries.insert(
            TypeId::of::<Option<T>>(),
            Construction::Closed(Box::new(|source| {
                let value = source.nullable_opaque(|inner| inner.reflectively::<T>())?;
                Ok(Box::new(value) as Box<dyn Any>)
            })),
        );
        self
    }

    /// Register `Vec<T>` with default size bounds, elements via `T`'s own
    /// generation path.
    pub fn vec_of<T: Any>(mut self) -> Self {
        self.entries.insert(
            TypeId::of::<Vec<T>>(),
            Construction::Closed(Box::new(|source| {
                let value = source.next_vec_of::<T>()?;
                Ok(Box::new(value) as Box<dyn Any>)
            })),
        );
        self
    }

    /// Register `HashSet<T>` with default size bounds.
    pub fn set_of<T: Any + Eq + Hash>(mut self) -> Self {
        self.entries.insert(
            TypeId::of::<HashSet<T>>(),
            Construction::Closed(Box::new(|source| {
                let value = source.next_set_of::<T>()?;
                Ok(Box::new(value) as Box<dyn Any>)
            })),
        );
        self
    }

    /// Register `HashMap<K, V>` with default size bounds, keys and values via
    /// their own generation paths.
    pub fn map_of<K: Any + Eq + Hash, V: Any>(mut self) -> Self {
        self.entries.insert(
            TypeId::of::<HashMap<K, V>>(),
            Construction::Closed(Box::new(|source| {
                let value = source.next_map_of::<K, V>()?;
                Ok(Box::new(value) as Box<dyn Any>)
            })),
        );
        self
    }

    pub fn build(self) -> StructuralRegistry {
        StructuralRegistry {
            entries: self.entries,
        }
    }
}

/// Build a [`ConstructorDescriptor`] from closure-like syntax:
///
/// ```
/// use wellspring_core::descriptor;
/// # struct Instant { millis: i64 }
/// # impl Instant { fn from_millis(millis: i64) -> Self { Instant { millis } } }
/// let d = descriptor!(|millis: i64| -> Instant { Instant::from_millis(millis) });
/// assert_eq!(d.params().len(), 1);
/// ```
///
/// The body must evaluate to the target type; fallible factories use
/// [`ConstructorDescriptor::new`] directly.
#[macro_export]
macro_rules! descriptor {
    (|| -> $out:ty $body:block) => {
        $crate::structural::ConstructorDescriptor::new(vec![], move |_args| {
            let value: $out = $body;
            Ok(Box::new(value) as Box<dyn ::std::any::Any>)
        })
    };
    (| $($arg:ident : $ty:ty),+ $(,)? | -> $out:ty $body:block) => {
        $crate::structural::ConstructorDescriptor::new(
            vec![$($crate::structural::TypeKey::of::<$ty>()),+],
            move |mut args: $crate::structural::ArgList| {
                $(let $arg: $ty = args.take::<$ty>()?;)+
                let value: $out = $body;
                Ok(Box::new(value) as Box<dyn ::std::any::Any>)
            },
        )
    };
}
