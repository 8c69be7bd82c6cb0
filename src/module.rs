// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static registration tables: the unit of mapper discovery.
//!
//! A [`MapperModule`] is an explicitly-populated table of mapper
//! implementations and the ordered type pairs they serve. It replaces any
//! notion of scanning a code unit at runtime: each implementation registers
//! its pairs through one call at initialization, and a mapper serving both
//! directions of a pair registers twice, once per ordered direction.
//!
//! Modules are handed to a
//! [`ServiceCollection`](crate::provider::ServiceCollection), which wires
//! their implementations into a lifetime scope and marks them for dispatch
//! preload.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::invoke::{bind, ErasedMapFn};
use crate::mapper::Mapper;
use crate::registry::TypePair;

/// One registered (implementation, ordered pair) row.
#[derive(Clone, Copy)]
pub(crate) struct ModuleEntry {
    pub(crate) mapper_id: TypeId,
    pub(crate) mapper_name: &'static str,
    pub(crate) pair: TypePair,
    pub(crate) source_name: &'static str,
    pub(crate) destination_name: &'static str,
    /// Invoked by the dispatch registry when the descriptor is built.
    pub(crate) bind: fn() -> ErasedMapFn,
    /// Invoked by the provider to construct a fresh mapper instance.
    pub(crate) construct: fn() -> Arc<dyn Any + Send + Sync>,
}

/// An implementation type together with every pair it registered.
#[derive(Debug, Clone)]
pub struct MapperTypeData {
    /// Identity of the implementation type.
    pub mapper_id: TypeId,
    /// Name of the implementation type.
    pub mapper_name: &'static str,
    /// The ordered pairs this implementation serves.
    pub pairs: Vec<TypePair>,
}

/// A named registration table of mapper implementations.
pub struct MapperModule {
    name: &'static str,
    entries: Vec<ModuleEntry>,
}

impl MapperModule {
    /// Create an empty module.
    pub fn new(name: &'static str) -> Self {
        Self { name, entries: Vec::new() }
    }

    /// Module name, used in logs and configuration errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register `M` as the mapper for the ordered pair `(S, D)`.
    ///
    /// A mapper that also serves the opposite direction registers a second
    /// time with the parameters swapped; the two registrations are fully
    /// independent dispatch keys.
    pub fn register<M, S, D>(&mut self) -> &mut Self
    where
        M: Mapper<S, D> + Default + Send + Sync + 'static,
        S: 'static,
        D: 'static,
    {
        self.entries.push(ModuleEntry {
            mapper_id: TypeId::of::<M>(),
            mapper_name: type_name::<M>(),
            pair: TypePair::of::<S, D>(),
            source_name: type_name::<S>(),
            destination_name: type_name::<D>(),
            bind: bind::<M, S, D>,
            construct: construct_default::<M>,
        });
        self
    }

    /// Number of registered (implementation, pair) rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the module has no registrations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enumerate each registered implementation with all of its pairs.
    ///
    /// A type appears once with every pair it registered. No ordering
    /// guarantee across implementations.
    pub fn type_data(&self) -> Vec<MapperTypeData> {
        let mut grouped: HashMap<TypeId, MapperTypeData> = HashMap::new();
        for entry in &self.entries {
            grouped
                .entry(entry.mapper_id)
                .or_insert_with(|| MapperTypeData {
                    mapper_id: entry.mapper_id,
                    mapper_name: entry.mapper_name,
                    pairs: Vec::new(),
                })
                .pairs
                .push(entry.pair);
        }
        grouped.into_values().collect()
    }

    pub(crate) fn entries(&self) -> &[ModuleEntry] {
        &self.entries
    }
}

fn construct_default<M: Default + Send + Sync + 'static>() -> Arc<dyn Any + Send + Sync> {
    Arc::new(M::default())
}
