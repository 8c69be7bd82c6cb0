// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapper facade: the type-erased `map` entry points.
//!
//! A [`MapperService`] owns the dispatch registry and the root resolution
//! scope. Each call resolves the descriptor for the exact runtime type pair
//! of the two values, resolves a live mapper instance from the chosen
//! scope, and runs the compiled invocation shim. Calls are stateless with
//! respect to the facade and return `&Self` for chaining.
//!
//! The erased surface takes `Option`-typed source/destination and fails
//! with `Argument` before any resolution work when either is absent; the
//! typed surface is statically non-null and delegates.

use std::any::Any;
use std::fmt;

use crate::error::{MapperError, Result};
use crate::provider::{Scope, ServiceProvider};
use crate::registry::{DispatchRegistry, MapperDescriptor};

/// The global mapper facade.
pub struct MapperService {
    registry: DispatchRegistry,
    provider: ServiceProvider,
}

impl MapperService {
    pub(crate) fn new(registry: DispatchRegistry, provider: ServiceProvider) -> Self {
        Self { registry, provider }
    }

    /// The dispatch registry backing this service.
    pub fn registry(&self) -> &DispatchRegistry {
        &self.registry
    }

    /// The instance provider backing this service.
    pub fn provider(&self) -> &ServiceProvider {
        &self.provider
    }

    /// Shorthand for [`ServiceProvider::create_scope`].
    pub fn create_scope(&self) -> Scope {
        self.provider.create_scope()
    }

    /// Map `source` onto `destination` using the root scope.
    pub fn map_any(
        &self,
        source: Option<&dyn Any>,
        destination: Option<&mut dyn Any>,
        context: Option<&dyn Any>,
    ) -> Result<&Self> {
        self.map_any_in(self.provider.root(), source, destination, context)
    }

    /// Map `source` onto `destination`, resolving the mapper instance from
    /// the given scope.
    ///
    /// Both values must be present; an absent side fails with `Argument`
    /// before any resolution work is done.
    pub fn map_any_in(
        &self,
        scope: &Scope,
        source: Option<&dyn Any>,
        destination: Option<&mut dyn Any>,
        context: Option<&dyn Any>,
    ) -> Result<&Self> {
        let (Some(source), Some(destination)) = (source, destination) else {
            return Err(MapperError::Argument(
                "source and destination values must both be present",
            ));
        };

        let descriptor = self.registry.resolve_values(source, &*destination)?;
        self.invoke(scope, &descriptor, source, destination, context)
    }

    /// Typed sugar over [`map_any`](Self::map_any).
    pub fn map<S: Any, D: Any>(
        &self,
        source: &S,
        destination: &mut D,
        context: Option<&dyn Any>,
    ) -> Result<&Self> {
        self.map_in(self.provider.root(), source, destination, context)
    }

    /// Typed sugar over [`map_any_in`](Self::map_any_in).
    pub fn map_in<S: Any, D: Any>(
        &self,
        scope: &Scope,
        source: &S,
        destination: &mut D,
        context: Option<&dyn Any>,
    ) -> Result<&Self> {
        let descriptor = self.registry.resolve::<S, D>()?;
        self.invoke(scope, &descriptor, source, destination, context)
    }

    /// Map `source` into a freshly defaulted `D` using the root scope.
    pub fn map_new<D: Any + Default>(
        &self,
        source: &dyn Any,
        context: Option<&dyn Any>,
    ) -> Result<D> {
        self.map_new_in(self.provider.root(), source, context)
    }

    /// Map `source` into a freshly defaulted `D`, resolving the mapper
    /// instance from the given scope.
    pub fn map_new_in<D: Any + Default>(
        &self,
        scope: &Scope,
        source: &dyn Any,
        context: Option<&dyn Any>,
    ) -> Result<D> {
        let mut destination = D::default();
        self.map_any_in(scope, Some(source), Some(&mut destination), context)?;
        Ok(destination)
    }

    /// Map only when both sides are present; otherwise do nothing.
    ///
    /// Unlike [`map_any`](Self::map_any), an absent side is not an error:
    /// the call is skipped silently and still chains.
    pub fn map_nullable(
        &self,
        source: Option<&dyn Any>,
        destination: Option<&mut dyn Any>,
        context: Option<&dyn Any>,
    ) -> Result<&Self> {
        self.map_nullable_in(self.provider.root(), source, destination, context)
    }

    /// Scoped variant of [`map_nullable`](Self::map_nullable).
    pub fn map_nullable_in(
        &self,
        scope: &Scope,
        source: Option<&dyn Any>,
        destination: Option<&mut dyn Any>,
        context: Option<&dyn Any>,
    ) -> Result<&Self> {
        match (source, destination) {
            (Some(source), Some(destination)) => {
                self.map_any_in(scope, Some(source), Some(destination), context)
            }
            _ => Ok(self),
        }
    }

    /// Map `source` into a freshly defaulted `D`, or return `Ok(None)` when
    /// the source is absent.
    pub fn map_nullable_new<D: Any + Default>(
        &self,
        source: Option<&dyn Any>,
        context: Option<&dyn Any>,
    ) -> Result<Option<D>> {
        self.map_nullable_new_in(self.provider.root(), source, context)
    }

    /// Scoped variant of [`map_nullable_new`](Self::map_nullable_new).
    pub fn map_nullable_new_in<D: Any + Default>(
        &self,
        scope: &Scope,
        source: Option<&dyn Any>,
        context: Option<&dyn Any>,
    ) -> Result<Option<D>> {
        match source {
            Some(source) => self.map_new_in(scope, source, context).map(Some),
            None => Ok(None),
        }
    }

    /// Map every source value into a freshly defaulted `D`.
    ///
    /// An empty input yields an empty output without any resolution work.
    pub fn map_many_new<'s, D: Any + Default>(
        &self,
        sources: impl IntoIterator<Item = &'s dyn Any>,
        context: Option<&dyn Any>,
    ) -> Result<Vec<D>> {
        self.map_many_new_in(self.provider.root(), sources, context)
    }

    /// Scoped variant of [`map_many_new`](Self::map_many_new).
    pub fn map_many_new_in<'s, D: Any + Default>(
        &self,
        scope: &Scope,
        sources: impl IntoIterator<Item = &'s dyn Any>,
        context: Option<&dyn Any>,
    ) -> Result<Vec<D>> {
        sources
            .into_iter()
            .map(|source| self.map_new_in(scope, source, context))
            .collect()
    }

    fn invoke(
        &self,
        scope: &Scope,
        descriptor: &MapperDescriptor,
        source: &dyn Any,
        destination: &mut dyn Any,
        context: Option<&dyn Any>,
    ) -> Result<&Self> {
        let mapper = scope.resolve(descriptor.mapper_id(), descriptor.mapper_name())?;
        descriptor.invoke(mapper.as_ref(), source, destination, context)?;
        Ok(self)
    }
}

impl fmt::Debug for MapperService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperService")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
