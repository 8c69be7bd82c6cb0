// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch registry behavior end to end: single-build guarantee under
//! first-access races, strict directionality, and preload semantics.

use std::any::Any;
use std::sync::{Arc, Barrier};
use std::thread;

use pairmap::{
    Lifetime, Mapper, MapperError, MapperModule, MapperService, ServiceCollection,
};

#[derive(Default, Debug, Clone, PartialEq)]
struct ModelB {
    text: String,
    number: i32,
    flag: bool,
}

#[derive(Default, Debug, Clone, PartialEq)]
struct ModelC {
    text: String,
    number: i32,
    flag: bool,
}

/// One implementation serving both directions; each direction is its own
/// registration and must never cross-invoke.
#[derive(Default)]
struct BToCAndCToBMapper;

impl Mapper<ModelB, ModelC> for BToCAndCToBMapper {
    fn map(&self, source: &ModelB, destination: &mut ModelC, _context: Option<&dyn Any>) {
        destination.text = format!("{}_C", source.text);
        destination.number = source.number + 2;
        destination.flag = source.flag;
    }
}

impl Mapper<ModelC, ModelB> for BToCAndCToBMapper {
    fn map(&self, source: &ModelC, destination: &mut ModelB, _context: Option<&dyn Any>) {
        destination.text = format!("{}_B", source.text);
        destination.number = source.number - 2;
        destination.flag = source.flag;
    }
}

fn build_service(preload: bool) -> MapperService {
    let mut module = MapperModule::new("models");
    module
        .register::<BToCAndCToBMapper, ModelB, ModelC>()
        .register::<BToCAndCToBMapper, ModelC, ModelB>();

    let mut services = ServiceCollection::new();
    services
        .register_mappers_with(module, Lifetime::Singleton, preload)
        .unwrap();
    services.build().unwrap()
}

#[test]
fn concurrent_first_resolution_builds_exactly_one_descriptor() {
    let service = Arc::new(build_service(false));
    assert_eq!(service.registry().build_count(), 0);

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let source = ModelB { text: "b".into(), number: 1, flag: true };
                let mut destination = ModelC::default();
                barrier.wait();
                service.map(&source, &mut destination, None).unwrap();
                assert_eq!(destination.number, 3);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(service.registry().build_count(), 1);
}

#[test]
fn dual_direction_mapper_never_cross_invokes() {
    let service = build_service(true);

    let b = ModelB { text: "InitialB".into(), number: 43, flag: false };
    let mut c = ModelC::default();
    service.map(&b, &mut c, None).unwrap();
    assert_eq!(c, ModelC { text: "InitialB_C".into(), number: 45, flag: false });

    let c = ModelC { text: "InitialC".into(), number: 44, flag: true };
    let mut b = ModelB::default();
    service.map(&c, &mut b, None).unwrap();
    assert_eq!(b, ModelB { text: "InitialC_B".into(), number: 42, flag: true });
}

#[test]
fn preload_makes_first_calls_pure_cache_hits() {
    let service = build_service(true);
    assert_eq!(service.registry().build_count(), 2);
    assert_eq!(service.registry().resolved_count(), 2);

    let b = ModelB { text: "b".into(), number: 0, flag: false };
    let mut c = ModelC::default();
    service.map(&b, &mut c, None).unwrap();

    // Nothing further was built.
    assert_eq!(service.registry().build_count(), 2);
}

#[test]
fn repeated_lazy_resolution_shares_the_published_descriptor() {
    let service = build_service(false);

    let first = service.registry().resolve::<ModelB, ModelC>().unwrap();
    let second = service.registry().resolve::<ModelB, ModelC>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(service.registry().build_count(), 1);
}

#[test]
fn failed_resolution_leaves_the_cache_unmodified() {
    let service = build_service(false);

    let err = service.registry().resolve::<ModelB, ModelB>().unwrap_err();
    assert!(matches!(err, MapperError::MappingNotSupported { .. }));
    assert_eq!(service.registry().resolved_count(), 0);
    assert_eq!(service.registry().build_count(), 0);
}
