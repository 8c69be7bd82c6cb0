// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch registry: ordered type pairs to compiled invocation descriptors.
//!
//! The registry is the only cross-thread shared mutable state in the crate.
//! It maps a [`TypePair`] (the exact runtime types of the two values,
//! direction-sensitive) to an immutable [`MapperDescriptor`] holding the
//! bound invocation shim.
//!
//! Resolution paths:
//! - Fast path: concurrent cache read, returns the shared descriptor.
//! - Slow path: shard-exclusive get-or-insert that re-checks under lock,
//!   so at most one descriptor is ever built and published per pair even
//!   under a first-access race from many threads.
//! - Miss: a pair no module declared fails with `MappingNotSupported` and
//!   leaves the cache untouched.
//!
//! Pairs declared by preload-marked modules are built eagerly at
//! construction; pairs from other modules stay lazily resolvable.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{MapperError, Result};
use crate::invoke::ErasedMapFn;
use crate::module::MapperModule;

/// Ordered (source, destination) dispatch key.
///
/// Direction matters: `(A, B)` and `(B, A)` are distinct keys even when the
/// same implementation type serves both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypePair {
    /// Exact runtime type of the source value.
    pub source: TypeId,
    /// Exact runtime type of the destination value.
    pub destination: TypeId,
}

impl TypePair {
    /// Key for a statically known pair.
    pub fn of<S: 'static, D: 'static>() -> Self {
        Self {
            source: TypeId::of::<S>(),
            destination: TypeId::of::<D>(),
        }
    }

    /// Key from the exact runtime types of two values.
    pub fn of_values(source: &dyn Any, destination: &dyn Any) -> Self {
        Self {
            source: source.type_id(),
            destination: destination.type_id(),
        }
    }
}

/// A resolved pair: implementation identity plus the bound invocation shim.
///
/// Immutable once published into the registry; shared via `Arc`.
pub struct MapperDescriptor {
    pair: TypePair,
    mapper_id: TypeId,
    mapper_name: &'static str,
    invoke: ErasedMapFn,
}

impl MapperDescriptor {
    /// The pair this descriptor resolves.
    pub fn pair(&self) -> TypePair {
        self.pair
    }

    /// Identity of the implementation type to resolve from a scope.
    pub fn mapper_id(&self) -> TypeId {
        self.mapper_id
    }

    /// Name of the implementation type.
    pub fn mapper_name(&self) -> &'static str {
        self.mapper_name
    }

    /// Run the compiled call: three downcasts plus one direct call.
    pub fn invoke(
        &self,
        mapper: &(dyn Any + Send + Sync),
        source: &dyn Any,
        destination: &mut dyn Any,
        context: Option<&dyn Any>,
    ) -> Result<()> {
        (self.invoke)(mapper, source, destination, context)
    }
}

impl fmt::Debug for MapperDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperDescriptor")
            .field("pair", &self.pair)
            .field("mapper", &self.mapper_name)
            .finish_non_exhaustive()
    }
}

/// One declared pair, frozen at registry construction.
struct DeclaredEntry {
    mapper_id: TypeId,
    mapper_name: &'static str,
    source_name: &'static str,
    destination_name: &'static str,
    bind: fn() -> ErasedMapFn,
    preload: bool,
}

/// Thread-safe cache resolving ordered type pairs to descriptors.
pub struct DispatchRegistry {
    /// Pair -> declared mapper row. Immutable after construction.
    declared: HashMap<TypePair, DeclaredEntry>,
    /// Type name lookup for values arriving through the erased surface.
    names: HashMap<TypeId, &'static str>,
    /// Published descriptors. Concurrent reads, shard-exclusive inserts.
    cache: DashMap<TypePair, Arc<MapperDescriptor>>,
    /// Number of slow-path descriptor builds (observable for tests).
    builds: AtomicUsize,
}

impl DispatchRegistry {
    /// Build the declared-pair table from registered modules and eagerly
    /// resolve every pair declared by a preload-marked module.
    ///
    /// Fails with `Configuration` when two registrations claim the same
    /// ordered pair: static registration makes genuine ambiguity detectable
    /// at startup, so it is rejected instead of silently picking one.
    pub(crate) fn from_modules(modules: &[(MapperModule, bool)]) -> Result<Self> {
        let mut declared = HashMap::new();
        let mut names = HashMap::new();

        for (module, preload) in modules {
            for entry in module.entries() {
                names.insert(entry.pair.source, entry.source_name);
                names.insert(entry.pair.destination, entry.destination_name);
                names.insert(entry.mapper_id, entry.mapper_name);

                if let Some(existing) = declared.insert(
                    entry.pair,
                    DeclaredEntry {
                        mapper_id: entry.mapper_id,
                        mapper_name: entry.mapper_name,
                        source_name: entry.source_name,
                        destination_name: entry.destination_name,
                        bind: entry.bind,
                        preload: *preload,
                    },
                ) {
                    return Err(MapperError::Configuration(format!(
                        "module '{}': mappers '{}' and '{}' both registered for \
                         '{}' -> '{}'",
                        module.name(),
                        existing.mapper_name,
                        entry.mapper_name,
                        entry.source_name,
                        entry.destination_name,
                    )));
                }
            }
        }

        let registry = Self {
            declared,
            names,
            cache: DashMap::new(),
            builds: AtomicUsize::new(0),
        };
        registry.preload();
        Ok(registry)
    }

    /// Eagerly build descriptors for every preload-declared pair so common
    /// pairs skip the slow path entirely in steady state.
    fn preload(&self) {
        let mut count = 0usize;
        for (pair, entry) in &self.declared {
            if entry.preload {
                self.publish(*pair, entry);
                count += 1;
            }
        }
        if count > 0 {
            log::debug!("dispatch preload complete: {} pair(s)", count);
        }
    }

    /// Resolve by the exact runtime types of two values.
    pub fn resolve_values(
        &self,
        source: &dyn Any,
        destination: &dyn Any,
    ) -> Result<Arc<MapperDescriptor>> {
        let pair = TypePair::of_values(source, destination);
        self.resolve_pair(pair, || {
            (self.type_name_of(pair.source), self.type_name_of(pair.destination))
        })
    }

    /// Resolve a statically known pair.
    pub fn resolve<S: 'static, D: 'static>(&self) -> Result<Arc<MapperDescriptor>> {
        self.resolve_pair(TypePair::of::<S, D>(), || {
            (
                std::any::type_name::<S>().to_string(),
                std::any::type_name::<D>().to_string(),
            )
        })
    }

    /// Number of descriptors built on the slow path (including preload).
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Number of published descriptors.
    pub fn resolved_count(&self) -> usize {
        self.cache.len()
    }

    fn resolve_pair(
        &self,
        pair: TypePair,
        error_names: impl FnOnce() -> (String, String),
    ) -> Result<Arc<MapperDescriptor>> {
        // Fast path: concurrent read, no exclusive locking.
        if let Some(hit) = self.cache.get(&pair) {
            log::trace!("dispatch cache hit for {}", hit.mapper_name);
            return Ok(Arc::clone(&hit));
        }

        // A pair nobody declared fails without touching the cache.
        let Some(entry) = self.declared.get(&pair) else {
            let (source_type, destination_type) = error_names();
            return Err(MapperError::MappingNotSupported { source_type, destination_type });
        };

        Ok(self.publish(pair, entry))
    }

    /// Get-or-insert-once: the entry holds the shard write lock, so the
    /// closure runs for at most one thread per pair; losers of the race see
    /// the winner's descriptor after re-checking under the lock.
    fn publish(&self, pair: TypePair, entry: &DeclaredEntry) -> Arc<MapperDescriptor> {
        Arc::clone(&self.cache.entry(pair).or_insert_with(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            log::debug!(
                "building dispatch descriptor '{}' -> '{}' via {}",
                entry.source_name,
                entry.destination_name,
                entry.mapper_name
            );
            Arc::new(MapperDescriptor {
                pair,
                mapper_id: entry.mapper_id,
                mapper_name: entry.mapper_name,
                invoke: (entry.bind)(),
            })
        }))
    }

    fn type_name_of(&self, id: TypeId) -> String {
        match self.names.get(&id) {
            Some(name) => (*name).to_string(),
            None => format!("{id:?}"),
        }
    }
}

impl fmt::Debug for DispatchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchRegistry")
            .field("declared", &self.declared.len())
            .field("resolved", &self.cache.len())
            .field("builds", &self.build_count())
            .finish()
    }
}
