// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # pairmap - runtime type-pair mapper dispatch
//!
//! Copy/transform field values from a runtime source value onto an existing
//! destination value without knowing, at compile time, which concrete
//! mapper applies. Small mapper types each serve one or more ordered
//! (Source, Destination) pairs; at call time the service resolves the
//! matching implementation by the exact runtime types of the two values and
//! invokes it through an invocation shim bound once per pair.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::any::Any;
//! use pairmap::{Lifetime, Mapper, MapperModule, Result, ServiceCollection};
//!
//! #[derive(Default)]
//! struct Celsius { degrees: f64 }
//! #[derive(Default)]
//! struct Fahrenheit { degrees: f64 }
//!
//! #[derive(Default)]
//! struct CelsiusToFahrenheit;
//!
//! impl Mapper<Celsius, Fahrenheit> for CelsiusToFahrenheit {
//!     fn map(&self, source: &Celsius, destination: &mut Fahrenheit,
//!            _context: Option<&dyn Any>) {
//!         destination.degrees = source.degrees * 9.0 / 5.0 + 32.0;
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let mut module = MapperModule::new("temperatures");
//!     module.register::<CelsiusToFahrenheit, Celsius, Fahrenheit>();
//!
//!     let mut services = ServiceCollection::new();
//!     services.register_mappers(module, Lifetime::Singleton)?;
//!     let mapper = services.build()?;
//!
//!     let source = Celsius { degrees: 100.0 };
//!     let mut destination = Fahrenheit::default();
//!     mapper.map(&source, &mut destination, None)?;
//!     assert_eq!(destination.degrees, 212.0);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                        MapperService                         |
//! |     map / map_in / map_any / map_any_in / map_new            |
//! +--------------------------------------------------------------+
//! |  DispatchRegistry            |  ServiceProvider / Scope      |
//! |  (TypePair -> descriptor,    |  (lifetime-scoped mapper      |
//! |   get-or-insert-once cache)  |   instance resolution)        |
//! +--------------------------------------------------------------+
//! |  MapperModule (static registration table)                    |
//! |  invoke (downcast-and-call shim bound once per pair)         |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Mapper`] | The one-way mapping capability implemented by user types |
//! | [`MapperModule`] | Static registration table of implementations and pairs |
//! | [`ServiceCollection`] | Wires modules into lifetimes, builds the service |
//! | [`MapperService`] | Type-erased facade resolving and invoking mappers |
//! | [`DispatchRegistry`] | Concurrent pair-to-descriptor cache |
//! | [`Scope`] | Resolution scope honoring each mapper's lifetime policy |
//!
//! ## Concurrency
//!
//! Calls are synchronous and run to completion on the caller's thread. The
//! descriptor cache is the only shared mutable state: concurrent reads on
//! the fast path, and an exclusive get-or-insert-once on first access, so
//! at most one descriptor is ever built per pair. Concurrent calls against
//! the *same* destination value are a caller-introduced race; the crate
//! does not synchronize destination mutation.

/// Error taxonomy and the crate-wide `Result` alias.
pub mod error;
/// The `Mapper` capability trait and typed convenience layer.
pub mod mapper;
/// Static registration tables (the unit of discovery).
pub mod module;
/// Lifetime scopes and mapper instance resolution.
pub mod provider;
/// The dispatch registry: pair resolution and descriptor caching.
pub mod registry;
/// The type-erased mapper facade.
pub mod service;

mod invoke;

pub use error::{MapperError, Result};
pub use mapper::{Mapper, MapperExt, NewContext};
pub use module::{MapperModule, MapperTypeData};
pub use provider::{Lifetime, Scope, ServiceCollection, ServiceProvider};
pub use registry::{DispatchRegistry, MapperDescriptor, TypePair};
pub use service::MapperService;
