//! The generation facade.
//!
//! A [`Source`] is one trial's engine instance: a seeded [`BitSource`], an
//! [`IntervalTracker`], and shared handles to the two registries. Every
//! getter brackets its work in an interval, recursively down through
//! container elements and constructor arguments, so the trace a trial
//! leaves behind maps each sub-value to the bits that produced it.
//!
//! The facade is reentrant by design: element generators and constructor
//! factories call back into the same `Source` on the same thread, and the
//! LIFO interval stack is what keeps that sound without locks.

use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::code_points;
use crate::entropy::BitSource;
use crate::error::{Result, SourceError};
use crate::interval::{Interval, IntervalTracker};
use crate::range::{self, Range};
use crate::registry::GeneratorRegistry;
use crate::structural::{ArgList, Construction, ConstructorDescriptor, StructuralRegistry, TypeKey};

/// Default container and string size bounds when the caller gives none.
pub const DEFAULT_MIN_SIZE: usize = 0;
pub const DEFAULT_MAX_SIZE: usize = 64;

/// Distinct-element draws allowed per requested element before a set or map
/// gives up on growing further.
const DISTINCT_RETRY_FACTOR: usize = 10;

macro_rules! integer_getters {
    ($($t:ty => ($full:ident, $to:ident, $bounded:ident, $ranged:ident)),* $(,)?) => {
        $(
            #[doc = concat!("Uniform `", stringify!($t), "` over the full representable range.")]
            pub fn $full(&mut self) -> Result<$t> {
                self.$ranged(&[Range::new(<$t>::MIN, <$t>::MAX)])
            }

            #[doc = concat!("Uniform `", stringify!($t), "` from the kind's minimum up to `max` inclusive.")]
            pub fn $to(&mut self, max: $t) -> Result<$t> {
                self.$ranged(&[Range::new(<$t>::MIN, max)])
            }

            #[doc = concat!("Uniform `", stringify!($t), "` in `[min, max]` inclusive.")]
            pub fn $bounded(&mut self, min: $t, max: $t) -> Result<$t> {
                self.$ranged(&[Range::new(min, max)])
            }

            #[doc = concat!("Uniform `", stringify!($t), "` over the union of the supplied ranges, \
                             each value weighted by total width rather than by sub-range.")]
            pub fn $ranged(&mut self, ranges: &[Range<$t>]) -> Result<$t> {
                self.in_interval(|source| range::sample_ordinal(&mut source.bits, ranges))
            }
        )*
    };
}

/// One trial's generation engine.
pub struct Source {
    bits: BitSource,
    intervals: IntervalTracker,
    generators: Arc<GeneratorRegistry>,
    structurals: Arc<StructuralRegistry>,
}

impl Source {
    /// A source with empty registries; type-directed requests resolve only
    /// leaf kinds.
    pub fn new(seed: u64) -> Self {
        Source::with_registries(
            seed,
            Arc::new(GeneratorRegistry::empty()),
            Arc::new(StructuralRegistry::empty()),
        )
    }

    /// A source sharing registries with other trials.
    pub fn with_registries(
        seed: u64,
        generators: Arc<GeneratorRegistry>,
        structurals: Arc<StructuralRegistry>,
    ) -> Self {
        Source {
            bits: BitSource::new(seed),
            intervals: IntervalTracker::new(),
            generators,
            structurals,
        }
    }

    /// Reinitialize for a new trial: entropy reseeded, trace cleared.
    pub fn reset(&mut self, seed: u64) {
        self.bits.reset(seed);
        self.intervals = IntervalTracker::new();
    }

    /// Bits consumed so far this trial.
    pub fn bits_consumed(&self) -> u64 {
        self.bits.bits_consumed()
    }

    /// Completed intervals so far, in pop order.
    pub fn trace(&self) -> &[Interval] {
        self.intervals.trace()
    }

    /// Finish the trial, yielding the full trace; errors if a custom
    /// generator left a frame open.
    pub fn finish(self) -> Result<Vec<Interval>> {
        self.intervals.into_trace()
    }

    /// Open an interval frame at the current bit position. Custom composite
    /// generators use this (paired with [`Source::pop_interval`]) to appear
    /// in the shrink trace as a single unit.
    pub fn push_interval(&mut self) {
        self.intervals.push(self.bits.bits_consumed());
    }

    /// Close the most recently opened frame, recording the value produced.
    ///
    /// # Panics
    ///
    /// Panics if no frame is open.
    pub fn pop_interval(&mut self, value: impl fmt::Debug) {
        self.pop_rendered(format!("{value:?}"));
    }

    fn pop_rendered(&mut self, rendered: String) {
        self.intervals.pop(self.bits.bits_consumed(), rendered);
    }

    /// Run `f` inside its own interval frame. The frame closes on both the
    /// success and the error path, so a failing generation still leaves a
    /// balanced stack behind for diagnosis.
    fn in_interval<T, F>(&mut self, f: F) -> Result<T>
    where
        T: fmt::Debug,
        F: FnOnce(&mut Source) -> Result<T>,
    {
        self.push_interval();
        let out = f(self);
        match &out {
            Ok(value) => self.pop_rendered(format!("{value:?}")),
            Err(_) => self.pop_rendered("!error".to_string()),
        }
        out
    }

    // ---- primitives ------------------------------------------------------

    integer_getters! {
        i8 => (next_i8, next_i8_to, next_i8_in, next_i8_ranges),
        i16 => (next_i16, next_i16_to, next_i16_in, next_i16_ranges),
        i32 => (next_i32, next_i32_to, next_i32_in, next_i32_ranges),
        i64 => (next_i64, next_i64_to, next_i64_in, next_i64_ranges),
        i128 => (next_i128, next_i128_to, next_i128_in, next_i128_ranges),
        u8 => (next_u8, next_u8_to, next_u8_in, next_u8_ranges),
        u16 => (next_u16, next_u16_to, next_u16_in, next_u16_ranges),
        u32 => (next_u32, next_u32_to, next_u32_in, next_u32_ranges),
        u64 => (next_u64, next_u64_to, next_u64_in, next_u64_ranges),
        u128 => (next_u128, next_u128_to, next_u128_in, next_u128_ranges),
    }

    /// Uniform boolean.
    pub fn next_bool(&mut self) -> Result<bool> {
        self.in_interval(|source| Ok(source.bits.next_bits(1) == 1))
    }

    /// An `f64` from raw bit patterns. `NaN` and the infinities are
    /// legitimate outputs; use [`Source::next_real_f64`] to exclude them.
    pub fn next_f64(&mut self) -> Result<f64> {
        self.in_interval(|source| Ok(range::raw_f64(&mut source.bits)))
    }

    /// Uniform `f64` from the lowest finite value up to `max`.
    pub fn next_f64_to(&mut self, max: f64) -> Result<f64> {
        self.next_f64_in(f64::MIN, max)
    }

    /// Uniform `f64` in `[min, max]`. Bounds must be finite and ordered.
    pub fn next_f64_in(&mut self, min: f64, max: f64) -> Result<f64> {
        self.in_interval(|source| range::sample_f64(&mut source.bits, min, max))
    }

    /// Uniform over the finite representable `f64` values.
    pub fn next_real_f64(&mut self) -> Result<f64> {
        self.in_interval(|source| Ok(range::real_f64(&mut source.bits)))
    }

    /// Uniform finite `f64` in `[min, max]`.
    pub fn next_real_f64_in(&mut self, min: f64, max: f64) -> Result<f64> {
        self.next_f64_in(min, max)
    }

    /// An `f32` from raw bit patterns, edge cases included.
    pub fn next_f32(&mut self) -> Result<f32> {
        self.in_interval(|source| Ok(range::raw_f32(&mut source.bits)))
    }

    /// Uniform `f32` from the lowest finite value up to `max`.
    pub fn next_f32_to(&mut self, max: f32) -> Result<f32> {
        self.next_f32_in(f32::MIN, max)
    }

    /// Uniform `f32` in `[min, max]`. Bounds must be finite and ordered.
    pub fn next_f32_in(&mut self, min: f32, max: f32) -> Result<f32> {
        self.in_interval(|source| range::sample_f32(&mut source.bits, min, max))
    }

    /// Uniform over the finite representable `f32` values.
    pub fn next_real_f32(&mut self) -> Result<f32> {
        self.in_interval(|source| Ok(range::real_f32(&mut source.bits)))
    }

    /// Uniform finite `f32` in `[min, max]`.
    pub fn next_real_f32_in(&mut self, min: f32, max: f32) -> Result<f32> {
        self.next_f32_in(min, max)
    }

    // ---- chars and strings ----------------------------------------------

    /// Uniform over all Unicode scalar values.
    pub fn next_char(&mut self) -> Result<char> {
        self.next_char_with(code_points::any)
    }

    /// A char from a code-point generator (see [`crate::code_points`]).
    pub fn next_char_with<G>(&mut self, code_point: G) -> Result<char>
    where
        G: FnOnce(&mut Source) -> Result<u32>,
    {
        self.in_interval(|source| {
            let cp = code_point(source)?;
            char_from_code_point(cp)
        })
    }

    /// A string of any scalar values, length in the default bounds.
    pub fn next_string(&mut self) -> Result<String> {
        self.next_string_in(code_points::any, DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE)
    }

    /// A string from a code-point generator, length in the default bounds.
    pub fn next_string_with<G>(&mut self, code_point: G) -> Result<String>
    where
        G: Fn(&mut Source) -> Result<u32>,
    {
        self.next_string_in(code_point, DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE)
    }

    /// A string of exactly `len` chars from a code-point generator.
    pub fn next_string_exact<G>(&mut self, code_point: G, len: usize) -> Result<String>
    where
        G: Fn(&mut Source) -> Result<u32>,
    {
        self.next_string_in(code_point, len, len)
    }

    /// A string from a code-point generator with length in
    /// `[min_len, max_len]`. Each char gets its own interval.
    pub fn next_string_in<G>(&mut self, code_point: G, min_len: usize, max_len: usize) -> Result<String>
    where
        G: Fn(&mut Source) -> Result<u32>,
    {
        self.in_interval(|source| {
            let len = source.draw_size(min_len, max_len)?;
            let mut out = String::with_capacity(len);
            for _ in 0..len {
                let c = source.in_interval(|inner| {
                    let cp = code_point(inner)?;
                    char_from_code_point(cp)
                })?;
                out.push(c);
            }
            Ok(out)
        })
    }

    // ---- containers ------------------------------------------------------

    /// A vector with length in the default bounds, elements from `element`.
    pub fn next_vec<T, G>(&mut self, element: G) -> Result<Vec<T>>
    where
        T: fmt::Debug,
        G: Fn(&mut Source) -> Result<T>,
    {
        self.next_vec_in(element, DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE)
    }

    /// A vector of exactly `len` elements.
    pub fn next_vec_exact<T, G>(&mut self, element: G, len: usize) -> Result<Vec<T>>
    where
        T: fmt::Debug,
        G: Fn(&mut Source) -> Result<T>,
    {
        self.next_vec_in(element, len, len)
    }

    /// A vector with length in `[min, max]`, each element bracketed by its
    /// own interval. Nested containers compose by passing a container getter
    /// as `element`.
    pub fn next_vec_in<T, G>(&mut self, element: G, min: usize, max: usize) -> Result<Vec<T>>
    where
        T: fmt::Debug,
        G: Fn(&mut Source) -> Result<T>,
    {
        self.in_interval(|source| {
            let len = source.draw_size(min, max)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(source.in_interval(&element)?);
            }
            Ok(items)
        })
    }

    /// A set with size in the default bounds; see [`Source::next_set_in`].
    pub fn next_set<T, G>(&mut self, element: G) -> Result<HashSet<T>>
    where
        T: Eq + Hash + fmt::Debug,
        G: Fn(&mut Source) -> Result<T>,
    {
        self.next_set_in(element, DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE)
    }

    /// A set of exactly `len` distinct elements, element space permitting.
    pub fn next_set_exact<T, G>(&mut self, element: G, len: usize) -> Result<HashSet<T>>
    where
        T: Eq + Hash + fmt::Debug,
        G: Fn(&mut Source) -> Result<T>,
    {
        self.next_set_in(element, len, len)
    }

    /// A set with size in `[min, max]`.
    ///
    /// A target size is drawn from the bounds, then candidates are drawn
    /// (ten per requested element) until the set reaches it. A realized size
    /// still below `min` when the budget runs out is
    /// [`SourceError::ElementExhaustion`]; between `min` and the target the
    /// set is returned short, since the element space may simply hold fewer
    /// distinct values than asked for.
    pub fn next_set_in<T, G>(&mut self, element: G, min: usize, max: usize) -> Result<HashSet<T>>
    where
        T: Eq + Hash + fmt::Debug,
        G: Fn(&mut Source) -> Result<T>,
    {
        self.in_interval(|source| {
            let target = source.draw_size(min, max)?;
            let budget = target * DISTINCT_RETRY_FACTOR;
            let mut set = HashSet::with_capacity(target);
            let mut draws = 0;
            while set.len() < target && draws < budget {
                draws += 1;
                set.insert(source.in_interval(&element)?);
            }
            if set.len() < min {
                return Err(SourceError::ElementExhaustion {
                    wanted: min,
                    got: set.len(),
                });
            }
            Ok(set)
        })
    }

    /// A map with size in the default bounds, values independent of keys.
    pub fn next_map<K, V, GK, GV>(&mut self, key: GK, value: GV) -> Result<HashMap<K, V>>
    where
        K: Eq + Hash + fmt::Debug,
        V: fmt::Debug,
        GK: Fn(&mut Source) -> Result<K>,
        GV: Fn(&mut Source) -> Result<V>,
    {
        self.next_map_in(key, value, DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE)
    }

    /// A map of exactly `len` entries, key space permitting.
    pub fn next_map_exact<K, V, GK, GV>(
        &mut self,
        key: GK,
        value: GV,
        len: usize,
    ) -> Result<HashMap<K, V>>
    where
        K: Eq + Hash + fmt::Debug,
        V: fmt::Debug,
        GK: Fn(&mut Source) -> Result<K>,
        GV: Fn(&mut Source) -> Result<V>,
    {
        self.next_map_in(key, value, len, len)
    }

    /// A map with size in `[min, max]`, values independent of keys. Same
    /// retry budget and shortfall policy as [`Source::next_set_in`];
    /// duplicate keys overwrite their earlier entry.
    pub fn next_map_in<K, V, GK, GV>(
        &mut self,
        key: GK,
        value: GV,
        min: usize,
        max: usize,
    ) -> Result<HashMap<K, V>>
    where
        K: Eq + Hash + fmt::Debug,
        V: fmt::Debug,
        GK: Fn(&mut Source) -> Result<K>,
        GV: Fn(&mut Source) -> Result<V>,
    {
        self.next_map_keyed_in(key, move |source, _key| value(source), min, max)
    }

    /// A map whose value generator sees the freshly generated key.
    pub fn next_map_keyed<K, V, GK, GV>(&mut self, key: GK, value: GV) -> Result<HashMap<K, V>>
    where
        K: Eq + Hash + fmt::Debug,
        V: fmt::Debug,
        GK: Fn(&mut Source) -> Result<K>,
        GV: Fn(&mut Source, &K) -> Result<V>,
    {
        self.next_map_keyed_in(key, value, DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE)
    }

    /// A map of exactly `len` entries with a key-dependent value generator.
    pub fn next_map_keyed_exact<K, V, GK, GV>(
        &mut self,
        key: GK,
        value: GV,
        len: usize,
    ) -> Result<HashMap<K, V>>
    where
        K: Eq + Hash + fmt::Debug,
        V: fmt::Debug,
        GK: Fn(&mut Source) -> Result<K>,
        GV: Fn(&mut Source, &K) -> Result<V>,
    {
        self.next_map_keyed_in(key, value, len, len)
    }

    /// A map with size in `[min, max]` and a key-dependent value generator.
    /// Key and value each get their own interval, key first.
    pub fn next_map_keyed_in<K, V, GK, GV>(
        &mut self,
        key: GK,
        value: GV,
        min: usize,
        max: usize,
    ) -> Result<HashMap<K, V>>
    where
        K: Eq + Hash + fmt::Debug,
        V: fmt::Debug,
        GK: Fn(&mut Source) -> Result<K>,
        GV: Fn(&mut Source, &K) -> Result<V>,
    {
        self.in_interval(|source| {
            let target = source.draw_size(min, max)?;
            let budget = target * DISTINCT_RETRY_FACTOR;
            let mut map = HashMap::with_capacity(target);
            let mut draws = 0;
            while map.len() < target && draws < budget {
                draws += 1;
                let k = source.in_interval(&key)?;
                let v = source.in_interval(|inner| value(inner, &k))?;
                map.insert(k, v);
            }
            if map.len() < min {
                return Err(SourceError::ElementExhaustion {
                    wanted: min,
                    got: map.len(),
                });
            }
            Ok(map)
        })
    }

    // ---- composition helpers --------------------------------------------

    /// Run an arbitrary generation function inside its own interval. This is
    /// the composition primitive custom generators are built from.
    pub fn generate<T, F>(&mut self, generator: F) -> Result<T>
    where
        T: fmt::Debug,
        F: FnOnce(&mut Source) -> Result<T>,
    {
        self.in_interval(generator)
    }

    /// With probability 1/4, `None`; otherwise delegate to `generator`.
    pub fn nullable<T, F>(&mut self, generator: F) -> Result<Option<T>>
    where
        T: fmt::Debug,
        F: FnOnce(&mut Source) -> Result<T>,
    {
        self.in_interval(|source| {
            if source.bits.next_bits(2) == 0 {
                Ok(None)
            } else {
                generator(source).map(Some)
            }
        })
    }

    /// Same draw as [`Source::nullable`] for values without a `Debug` form;
    /// the trace records the option's type instead.
    pub(crate) fn nullable_opaque<T, F>(&mut self, generator: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut Source) -> Result<T>,
    {
        self.push_interval();
        let out = if self.bits.next_bits(2) == 0 {
            Ok(None)
        } else {
            generator(self).map(Some)
        };
        match &out {
            Ok(Some(_)) => self.pop_rendered(format!("Some({})", type_name::<T>())),
            Ok(None) => self.pop_rendered("None".to_string()),
            Err(_) => self.pop_rendered("!error".to_string()),
        }
        out
    }

    /// A uniformly chosen element of `choices`. The draw goes through the
    /// range sampler as an index; the elements themselves never touch
    /// entropy.
    pub fn from<T>(&mut self, choices: &[T]) -> Result<T>
    where
        T: Clone + fmt::Debug,
    {
        if choices.is_empty() {
            return Err(SourceError::invalid_range(
                "cannot draw from an empty collection",
            ));
        }
        self.in_interval(|source| {
            let index =
                range::sample_ordinal(&mut source.bits, &[Range::new(0u64, (choices.len() - 1) as u64)])?;
            Ok(choices[index as usize].clone())
        })
    }

    // ---- type-directed construction -------------------------------------

    /// Build a `T` by type: registered generator first, then the built-in
    /// leaf kinds, then structural construction from registered descriptors.
    pub fn reflectively<T: Any>(&mut self) -> Result<T> {
        let key = TypeKey::of::<T>();
        let boxed = self.generate_keyed(key)?;
        boxed.downcast::<T>().map(|value| *value).map_err(|_| {
            SourceError::ReflectiveConstruction {
                type_name: key.name(),
                param: None,
                message: "registered generator produced a value of the wrong type".to_string(),
            }
        })
    }

    /// A vector of `T` built through the type-directed path, default bounds.
    pub fn next_vec_of<T: Any>(&mut self) -> Result<Vec<T>> {
        self.push_interval();
        let out = self.vec_of_inner::<T>();
        match &out {
            Ok(items) => {
                self.pop_rendered(format!("Vec<{}> ({} elements)", type_name::<T>(), items.len()))
            }
            Err(_) => self.pop_rendered("!error".to_string()),
        }
        out
    }

    fn vec_of_inner<T: Any>(&mut self) -> Result<Vec<T>> {
        let len = self.draw_size(DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(self.reflectively::<T>()?);
        }
        Ok(items)
    }

    /// A set of `T` built through the type-directed path, default bounds and
    /// the usual distinct-element budget.
    pub fn next_set_of<T: Any + Eq + Hash>(&mut self) -> Result<HashSet<T>> {
        self.push_interval();
        let out = self.set_of_inner::<T>();
        match &out {
            Ok(set) => {
                self.pop_rendered(format!("HashSet<{}> ({} elements)", type_name::<T>(), set.len()))
            }
            Err(_) => self.pop_rendered("!error".to_string()),
        }
        out
    }

    fn set_of_inner<T: Any + Eq + Hash>(&mut self) -> Result<HashSet<T>> {
        let target = self.draw_size(DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE)?;
        let budget = target * DISTINCT_RETRY_FACTOR;
        let mut set = HashSet::with_capacity(target);
        let mut draws = 0;
        while set.len() < target && draws < budget {
            draws += 1;
            set.insert(self.reflectively::<T>()?);
        }
        Ok(set)
    }

    /// A map built through the type-directed path, default bounds.
    pub fn next_map_of<K: Any + Eq + Hash, V: Any>(&mut self) -> Result<HashMap<K, V>> {
        self.push_interval();
        let out = self.map_of_inner::<K, V>();
        match &out {
            Ok(map) => self.pop_rendered(format!(
                "HashMap<{}, {}> ({} entries)",
                type_name::<K>(),
                type_name::<V>(),
                map.len()
            )),
            Err(_) => self.pop_rendered("!error".to_string()),
        }
        out
    }

    fn map_of_inner<K: Any + Eq + Hash, V: Any>(&mut self) -> Result<HashMap<K, V>> {
        let target = self.draw_size(DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE)?;
        let budget = target * DISTINCT_RETRY_FACTOR;
        let mut map = HashMap::with_capacity(target);
        let mut draws = 0;
        while map.len() < target && draws < budget {
            draws += 1;
            let key = self.reflectively::<K>()?;
            let value = self.reflectively::<V>()?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn generate_keyed(&mut self, key: TypeKey) -> Result<Box<dyn Any>> {
        self.push_interval();
        let out = self.generate_keyed_inner(key);
        match &out {
            Ok(_) => self.pop_rendered(key.name().to_string()),
            Err(_) => self.pop_rendered("!error".to_string()),
        }
        out
    }

    fn generate_keyed_inner(&mut self, key: TypeKey) -> Result<Box<dyn Any>> {
        let generators = Arc::clone(&self.generators);
        if let Some(generator) = generators.lookup(key.id()) {
            return generator(self);
        }
        if let Some(leaf) = self.leaf(key.id()) {
            return leaf;
        }
        let structurals = Arc::clone(&self.structurals);
        match structurals.lookup(key.id()) {
            Some(Construction::Closed(generator)) => generator(self),
            Some(Construction::Descriptors(descriptors)) => self.construct_from(key, descriptors),
            None => Err(SourceError::NoUsableConstructor {
                type_name: key.name(),
            }),
        }
    }

    /// Leaf kinds bypass constructor search entirely.
    fn leaf(&mut self, id: TypeId) -> Option<Result<Box<dyn Any>>> {
        macro_rules! leaf {
            ($t:ty, $getter:ident) => {
                if id == TypeId::of::<$t>() {
                    return Some(self.$getter().map(|v| Box::new(v) as Box<dyn Any>));
                }
            };
        }
        leaf!(bool, next_bool);
        leaf!(i8, next_i8);
        leaf!(i16, next_i16);
        leaf!(i32, next_i32);
        leaf!(i64, next_i64);
        leaf!(i128, next_i128);
        leaf!(u8, next_u8);
        leaf!(u16, next_u16);
        leaf!(u32, next_u32);
        leaf!(u64, next_u64);
        leaf!(u128, next_u128);
        leaf!(f32, next_f32);
        leaf!(f64, next_f64);
        leaf!(char, next_char);
        leaf!(String, next_string);
        None
    }

    fn construct_from(
        &mut self,
        key: TypeKey,
        descriptors: &[ConstructorDescriptor],
    ) -> Result<Box<dyn Any>> {
        // Most parameters first; the stable sort keeps declaration order
        // between equal counts.
        let mut order: Vec<usize> = (0..descriptors.len()).collect();
        order.sort_by(|&a, &b| {
            descriptors[b]
                .params()
                .len()
                .cmp(&descriptors[a].params().len())
        });

        let selected = order.into_iter().find(|&index| {
            descriptors[index]
                .params()
                .iter()
                .all(|param| self.satisfiable(param))
        });
        let Some(index) = selected else {
            return Err(SourceError::NoUsableConstructor {
                type_name: key.name(),
            });
        };

        let descriptor = &descriptors[index];
        let mut args: Vec<Box<dyn Any>> = Vec::with_capacity(descriptor.params().len());
        for (position, param) in descriptor.params().iter().enumerate() {
            let value = self.generate_keyed(*param).map_err(|err| {
                SourceError::ReflectiveConstruction {
                    type_name: key.name(),
                    param: Some(position),
                    message: err.to_string(),
                }
            })?;
            args.push(value);
        }
        descriptor
            .invoke(ArgList::new(args))
            .map_err(|err| SourceError::ReflectiveConstruction {
                type_name: key.name(),
                param: None,
                message: err.to_string(),
            })
    }

    fn satisfiable(&self, param: &TypeKey) -> bool {
        self.generators.lookup(param.id()).is_some()
            || is_leaf(param.id())
            || self.structurals.lookup(param.id()).is_some()
    }

    fn draw_size(&mut self, min: usize, max: usize) -> Result<usize> {
        if min > max {
            return Err(SourceError::invalid_range(format!(
                "min size {min} exceeds max size {max}"
            )));
        }
        let len = range::sample_ordinal(&mut self.bits, &[Range::new(min as u64, max as u64)])?;
        Ok(len as usize)
    }
}

fn is_leaf(id: TypeId) -> bool {
    id == TypeId::of::<bool>()
        || id == TypeId::of::<i8>()
        || id == TypeId::of::<i16>()
        || id == TypeId::of::<i32>()
        || id == TypeId::of::<i64>()
        || id == TypeId::of::<i128>()
        || id == TypeId::of::<u8>()
        || id == TypeId::of::<u16>()
        || id == TypeId::of::<u32>()
        || id == TypeId::of::<u64>()
        || id == TypeId::of::<u128>()
        || id == TypeId::of::<f32>()
        || id == TypeId::of::<f64>()
        || id == TypeId::of::<char>()
        || id == TypeId::of::<String>()
}

fn char_from_code_point(cp: u32) -> Result<char> {
    char::from_u32(cp).ok_or_else(|| {
        SourceError::invalid_range(format!(
            "code point {cp:#x} is not a Unicode scalar value"
        ))
    })
}
