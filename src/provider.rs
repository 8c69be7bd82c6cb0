// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifetime scopes and mapper instance resolution.
//!
//! The dispatch registry answers *which* implementation type serves a pair;
//! this module answers *which instance* of it a given caller gets:
//!
//! - `Singleton`: one instance shared by every scope of the provider.
//! - `Scoped`: one instance per [`Scope`] (the root provider counts as a
//!   scope of its own).
//! - `Transient`: a fresh instance per resolution.
//!
//! Distinct scopes resolving the same pair share the cached descriptor but
//! obtain instances honoring their own lifetime policy.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{MapperError, Result};
use crate::module::MapperModule;
use crate::registry::DispatchRegistry;
use crate::service::MapperService;

/// Lifetime policy applied to a registered mapper implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Not a valid policy; registering under it is a configuration error.
    Unknown,
    /// One instance per scope.
    Scoped,
    /// One instance per provider.
    Singleton,
    /// A fresh instance per resolution.
    Transient,
}

/// One registered implementation type.
#[derive(Clone, Copy)]
struct Registration {
    lifetime: Lifetime,
    mapper_name: &'static str,
    construct: fn() -> Arc<dyn Any + Send + Sync>,
}

/// Accumulates mapper registrations before the service is built.
#[derive(Default)]
pub struct ServiceCollection {
    registrations: HashMap<TypeId, Registration>,
    modules: Vec<(MapperModule, bool)>,
}

impl ServiceCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every implementation in `module` under `lifetime` and mark
    /// the module for dispatch preload.
    pub fn register_mappers(
        &mut self,
        module: MapperModule,
        lifetime: Lifetime,
    ) -> Result<&mut Self> {
        self.register_mappers_with(module, lifetime, true)
    }

    /// Register every implementation in `module` under `lifetime`.
    ///
    /// With `preload` unset the module's pairs are still resolvable, but
    /// only lazily on first use.
    pub fn register_mappers_with(
        &mut self,
        module: MapperModule,
        lifetime: Lifetime,
        preload: bool,
    ) -> Result<&mut Self> {
        if lifetime == Lifetime::Unknown {
            return Err(MapperError::Configuration(format!(
                "unsupported mapper lifetime for module '{}': {:?}",
                module.name(),
                lifetime
            )));
        }

        for entry in module.entries() {
            self.registrations.insert(
                entry.mapper_id,
                Registration {
                    lifetime,
                    mapper_name: entry.mapper_name,
                    construct: entry.construct,
                },
            );
        }
        self.modules.push((module, preload));
        Ok(self)
    }

    /// Build the mapper service: freeze the registrations, construct the
    /// dispatch registry, and run preload.
    ///
    /// Fails with `Configuration` when two registrations claim the same
    /// ordered pair.
    pub fn build(self) -> Result<MapperService> {
        let registry = DispatchRegistry::from_modules(&self.modules)?;
        let provider = ServiceProvider::new(self.registrations);
        Ok(MapperService::new(registry, provider))
    }
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("registrations", &self.registrations.len())
            .field("modules", &self.modules.len())
            .finish()
    }
}

/// Shared between the provider and every scope it creates.
struct ProviderShared {
    registrations: HashMap<TypeId, Registration>,
    /// Singleton instances, shared across all scopes.
    singletons: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

/// Root of instance resolution; factory for [`Scope`]s.
pub struct ServiceProvider {
    shared: Arc<ProviderShared>,
    root: Scope,
}

impl ServiceProvider {
    fn new(registrations: HashMap<TypeId, Registration>) -> Self {
        let shared = Arc::new(ProviderShared {
            registrations,
            singletons: DashMap::new(),
        });
        let root = Scope { shared: Arc::clone(&shared), scoped: DashMap::new() };
        Self { shared, root }
    }

    /// The provider's own resolution scope.
    pub fn root(&self) -> &Scope {
        &self.root
    }

    /// Create an independent scope with its own `Scoped` instance cache.
    pub fn create_scope(&self) -> Scope {
        Scope {
            shared: Arc::clone(&self.shared),
            scoped: DashMap::new(),
        }
    }
}

/// A resolution scope: holds its own `Scoped` instances, shares
/// `Singleton` instances with every other scope of the same provider.
pub struct Scope {
    shared: Arc<ProviderShared>,
    scoped: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Scope {
    /// Resolve an instance of the given implementation type, honoring its
    /// registered lifetime.
    pub(crate) fn resolve(
        &self,
        mapper_id: TypeId,
        mapper_name: &'static str,
    ) -> Result<Arc<dyn Any + Send + Sync>> {
        let Some(registration) = self.shared.registrations.get(&mapper_id) else {
            return Err(MapperError::Resolution { mapper: mapper_name });
        };

        match registration.lifetime {
            Lifetime::Singleton => Ok(Arc::clone(
                &self
                    .shared
                    .singletons
                    .entry(mapper_id)
                    .or_insert_with(registration.construct),
            )),
            Lifetime::Scoped => Ok(Arc::clone(
                &self.scoped.entry(mapper_id).or_insert_with(registration.construct),
            )),
            Lifetime::Transient => Ok((registration.construct)()),
            // Registration rejects Unknown; unreachable through public paths.
            Lifetime::Unknown => Err(MapperError::Configuration(format!(
                "mapper '{}' registered under an unknown lifetime",
                registration.mapper_name
            ))),
        }
    }
}
