// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invocation compiler: type-erased call shims bound once per pair.
//!
//! [`bind`] monomorphizes one downcast-and-call function for a concrete
//! (mapper, source, destination) triple and hands it out as a plain
//! function pointer. After that, every call through the descriptor performs
//! exactly three downcasts plus one direct call; no signature matching ever
//! happens on the hot path. This is the amortization target of the whole
//! design.

use std::any::{type_name, Any};

use crate::error::{MapperError, Result};
use crate::mapper::Mapper;

/// A compiled, type-erased mapping call:
/// `(mapper instance, source, destination, context)`.
pub(crate) type ErasedMapFn = fn(
    &(dyn Any + Send + Sync),
    &dyn Any,
    &mut dyn Any,
    Option<&dyn Any>,
) -> Result<()>;

/// Bind the downcast-and-call shim for one concrete mapping triple.
pub(crate) fn bind<M, S, D>() -> ErasedMapFn
where
    M: Mapper<S, D> + Send + Sync + 'static,
    S: 'static,
    D: 'static,
{
    shim::<M, S, D>
}

fn shim<M, S, D>(
    mapper: &(dyn Any + Send + Sync),
    source: &dyn Any,
    destination: &mut dyn Any,
    context: Option<&dyn Any>,
) -> Result<()>
where
    M: Mapper<S, D> + Send + Sync + 'static,
    S: 'static,
    D: 'static,
{
    // These downcasts cannot fail through the public API: the registry only
    // hands a descriptor the exact runtime types it was keyed under.
    let mapper = mapper.downcast_ref::<M>().ok_or_else(|| {
        MapperError::Internal(format!(
            "shim bound to mapper '{}' received a different implementation",
            type_name::<M>()
        ))
    })?;
    let source = source.downcast_ref::<S>().ok_or_else(|| {
        MapperError::Internal(format!(
            "shim bound to source '{}' received a different value type",
            type_name::<S>()
        ))
    })?;
    let destination = destination.downcast_mut::<D>().ok_or_else(|| {
        MapperError::Internal(format!(
            "shim bound to destination '{}' received a different value type",
            type_name::<D>()
        ))
    })?;

    mapper.map(source, destination, context);
    Ok(())
}
