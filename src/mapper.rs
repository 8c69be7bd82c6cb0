// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The one-way mapping capability and its typed convenience layer.
//!
//! [`Mapper`] is the seam every implementation plugs into: copy/transform
//! field values from an existing source onto an existing destination. One
//! type may implement several instantiations, including opposite directions
//! of the same pair (each direction is registered independently).
//!
//! [`MapperExt`] is pure glue on top: create-new-instance, nullable, and
//! batch variants. None of it touches the dispatch machinery.

use std::any::Any;

use crate::error::{MapperError, Result};

/// A uni-directional mapper from `S` onto an existing `D`.
pub trait Mapper<S, D> {
    /// Map the existing source value onto the existing destination value.
    ///
    /// `context` is an opaque, caller-supplied companion value; mappers
    /// that do not need one ignore it.
    fn map(&self, source: &S, destination: &mut D, context: Option<&dyn Any>);
}

/// Per-item context handed to destination factories.
///
/// Ephemeral: built for one factory call, never stored.
pub struct NewContext<'a, S: ?Sized> {
    /// Ordinal index of the item in a batch mapping (0 for single items).
    pub index: usize,
    /// The source value about to be mapped.
    pub source: &'a S,
    /// The opaque context passed to the mapping call, if any.
    pub context: Option<&'a dyn Any>,
}

/// Convenience variants over any [`Mapper`].
///
/// Factories return `Option<D>`: `None` means the factory could not produce
/// a destination, which the fallible variants surface as
/// [`MapperError::Factory`].
pub trait MapperExt<S, D>: Mapper<S, D> {
    /// Map into a freshly defaulted destination.
    fn map_new(&self, source: &S, context: Option<&dyn Any>) -> D
    where
        D: Default,
    {
        let mut destination = D::default();
        self.map(source, &mut destination, context);
        destination
    }

    /// Map into a destination produced by `factory`.
    fn map_new_with(
        &self,
        source: &S,
        factory: impl FnOnce(&NewContext<'_, S>) -> Option<D>,
        context: Option<&dyn Any>,
    ) -> Result<D> {
        let new_context = NewContext { index: 0, source, context };
        let mut destination =
            factory(&new_context).ok_or(MapperError::Factory { index: 0 })?;
        self.map(source, &mut destination, context);
        Ok(destination)
    }

    /// Map only when both sides are present; otherwise do nothing.
    ///
    /// Unlike the facade's hard `Argument` error, the nullable variants
    /// skip silently, mirroring their role as optional-plumbing sugar.
    fn map_nullable(
        &self,
        source: Option<&S>,
        destination: Option<&mut D>,
        context: Option<&dyn Any>,
    ) -> &Self {
        if let (Some(source), Some(destination)) = (source, destination) {
            self.map(source, destination, context);
        }
        self
    }

    /// Map into a freshly defaulted destination, or `None` when the source
    /// is absent.
    fn map_nullable_new(&self, source: Option<&S>, context: Option<&dyn Any>) -> Option<D>
    where
        D: Default,
    {
        source.map(|source| self.map_new(source, context))
    }

    /// Map into a factory-produced destination, or `Ok(None)` when the
    /// source is absent.
    fn map_nullable_new_with(
        &self,
        source: Option<&S>,
        factory: impl FnOnce(&NewContext<'_, S>) -> Option<D>,
        context: Option<&dyn Any>,
    ) -> Result<Option<D>> {
        match source {
            Some(source) => self.map_new_with(source, factory, context).map(Some),
            None => Ok(None),
        }
    }

    /// Map every source item into a freshly defaulted destination.
    ///
    /// An empty input yields an empty output.
    fn map_many_new<'s>(
        &self,
        sources: impl IntoIterator<Item = &'s S>,
        context: Option<&dyn Any>,
    ) -> Vec<D>
    where
        S: 's,
        D: Default,
    {
        sources
            .into_iter()
            .map(|source| self.map_new(source, context))
            .collect()
    }

    /// Map every source item into a factory-produced destination.
    ///
    /// The factory sees the running ordinal index of each item. An empty
    /// input yields an empty output without invoking the factory.
    fn map_many_new_with<'s>(
        &self,
        sources: impl IntoIterator<Item = &'s S>,
        factory: impl FnMut(&NewContext<'_, S>) -> Option<D>,
        context: Option<&dyn Any>,
    ) -> Result<Vec<D>>
    where
        S: 's,
    {
        let mut destination = Vec::new();
        self.map_many_into(sources, &mut destination, factory, context)?;
        Ok(destination)
    }

    /// Map every source item and append the results to an existing
    /// collection.
    fn map_many_into<'s>(
        &self,
        sources: impl IntoIterator<Item = &'s S>,
        destination: &mut Vec<D>,
        mut factory: impl FnMut(&NewContext<'_, S>) -> Option<D>,
        context: Option<&dyn Any>,
    ) -> Result<&Self>
    where
        S: 's,
    {
        for (index, source) in sources.into_iter().enumerate() {
            let new_context = NewContext { index, source, context };
            let mut item =
                factory(&new_context).ok_or(MapperError::Factory { index })?;
            self.map(source, &mut item, context);
            destination.push(item);
        }
        Ok(self)
    }
}

impl<S, D, M: Mapper<S, D> + ?Sized> MapperExt<S, D> for M {}
