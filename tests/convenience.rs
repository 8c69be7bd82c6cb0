// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Convenience layer over a plain mapper: new-instance, nullable, and
//! batch variants.

use std::any::Any;

use pairmap::{Mapper, MapperError, MapperExt};

#[derive(Default, Debug, Clone, PartialEq)]
struct ModelA {
    text: String,
    number: i32,
    flag: bool,
}

#[derive(Default, Debug, Clone, PartialEq)]
struct ModelB {
    text: String,
    number: i32,
    flag: bool,
}

#[derive(Default)]
struct AToBMapper;

impl Mapper<ModelA, ModelB> for AToBMapper {
    fn map(&self, source: &ModelA, destination: &mut ModelB, _context: Option<&dyn Any>) {
        destination.text = format!("{}_B", source.text);
        destination.number = source.number + 1;
        destination.flag = !source.flag;
    }
}

fn start_a(number: i32) -> ModelA {
    ModelA { text: format!("a{number}"), number, flag: true }
}

#[test]
fn map_new_fills_a_default_destination() {
    let mapped = AToBMapper.map_new(&start_a(1), None);
    assert_eq!(mapped, ModelB { text: "a1_B".into(), number: 2, flag: false });
}

#[test]
fn map_nullable_skips_silently_when_either_side_is_absent() {
    let source = start_a(1);
    let mut destination = ModelB { text: "kept".into(), number: 0, flag: false };

    AToBMapper.map_nullable(None, Some(&mut destination), None);
    assert_eq!(destination.text, "kept");

    AToBMapper.map_nullable(Some(&source), None, None);

    AToBMapper.map_nullable(Some(&source), Some(&mut destination), None);
    assert_eq!(destination.text, "a1_B");
}

#[test]
fn map_nullable_new_returns_none_for_absent_source() {
    assert_eq!(AToBMapper.map_nullable_new(None, None), None);

    let mapped = AToBMapper.map_nullable_new(Some(&start_a(3)), None).unwrap();
    assert_eq!(mapped.number, 4);
}

#[test]
fn batch_over_empty_input_yields_empty_and_calls_no_factory() {
    let sources: Vec<ModelA> = Vec::new();
    let mut factory_calls = 0;

    let mapped = AToBMapper
        .map_many_new_with(
            &sources,
            |_| {
                factory_calls += 1;
                Some(ModelB::default())
            },
            None,
        )
        .unwrap();

    assert!(mapped.is_empty());
    assert_eq!(factory_calls, 0);
}

#[test]
fn batch_over_absent_input_yields_empty() {
    let sources: Option<Vec<ModelA>> = None;

    let mapped = AToBMapper.map_many_new(sources.iter().flatten(), None);
    assert!(mapped.is_empty());
}

#[test]
fn batch_maps_every_item_with_its_ordinal_index() {
    let sources = vec![start_a(1), start_a(2), start_a(3)];
    let mut seen_indices = Vec::new();

    let mapped = AToBMapper
        .map_many_new_with(
            &sources,
            |ctx| {
                seen_indices.push(ctx.index);
                Some(ModelB::default())
            },
            None,
        )
        .unwrap();

    assert_eq!(seen_indices, vec![0, 1, 2]);
    assert_eq!(
        mapped.iter().map(|b| b.number).collect::<Vec<_>>(),
        vec![2, 3, 4]
    );
}

#[test]
fn batch_surfaces_a_factory_failure_with_its_index() {
    let sources = vec![start_a(1), start_a(2)];

    let err = AToBMapper
        .map_many_new_with(
            &sources,
            |ctx| (ctx.index == 0).then(ModelB::default),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, MapperError::Factory { index: 1 }));
}

#[test]
fn batch_appends_into_an_existing_collection() {
    let sources = vec![start_a(7)];
    let mut destination = vec![ModelB { text: "existing".into(), number: 0, flag: false }];

    AToBMapper
        .map_many_into(&sources, &mut destination, |_| Some(ModelB::default()), None)
        .unwrap();

    assert_eq!(destination.len(), 2);
    assert_eq!(destination[1].text, "a7_B");
}
