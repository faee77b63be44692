#![cfg(feature = "derive")]

use std::sync::Arc;

use wellspring::*;
use wellspring_derive::Structural;

#[derive(Structural, Debug, Clone, PartialEq)]
struct User {
    name: String,
    age: u32,
    active: bool,
}

#[derive(Structural, Debug, Clone, PartialEq)]
struct Point(i32, i32);

#[derive(Structural, Debug, Clone, PartialEq)]
struct Unit;

#[derive(Structural, Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Status {
    Active,
    Dormant,
    Banned,
}

#[derive(Structural, Debug)]
struct Account {
    owner: User,
    status: Status,
}

fn source_with(structurals: StructuralRegistry) -> Source {
    Source::with_registries(
        0xd2e1,
        Arc::new(GeneratorRegistry::empty()),
        Arc::new(structurals),
    )
}

#[test]
fn derived_struct_generates_every_field() {
    let registry = StructuralRegistry::builder().structural::<User>().build();
    let mut source = source_with(registry);
    let _user = source.reflectively::<User>().unwrap();

    // Each field shows up as its own interval beneath the struct's frame.
    let trace = source.finish().unwrap();
    assert!(trace.last().unwrap().value.contains("User"));
    assert!(trace.iter().any(|i| i.depth > 0));
}

#[test]
fn derived_tuple_struct_generates_in_order() {
    let registry = StructuralRegistry::builder().structural::<Point>().build();
    let mut source = source_with(registry);
    source.reflectively::<Point>().unwrap();
}

#[test]
fn derived_unit_struct_constructs() {
    let registry = StructuralRegistry::builder().structural::<Unit>().build();
    let mut source = source_with(registry);
    assert_eq!(source.reflectively::<Unit>().unwrap(), Unit);
}

#[test]
fn derived_enum_covers_every_variant() {
    let mut seen = std::collections::HashSet::new();
    for seed in 0..200 {
        let mut source = Source::with_registries(
            seed,
            Arc::new(GeneratorRegistry::empty()),
            Arc::new(StructuralRegistry::builder().structural::<Status>().build()),
        );
        seen.insert(source.reflectively::<Status>().unwrap());
    }
    assert_eq!(seen.len(), 3);
}

#[test]
fn derived_structs_nest_through_the_registry() {
    let registry = StructuralRegistry::builder()
        .structural::<User>()
        .structural::<Status>()
        .structural::<Account>()
        .build();
    let mut source = source_with(registry);
    let account = source.reflectively::<Account>().unwrap();
    assert!(matches!(
        account.status,
        Status::Active | Status::Dormant | Status::Banned
    ));
}

#[test]
fn derived_types_are_deterministic_per_seed() {
    let registry = || {
        StructuralRegistry::builder()
            .structural::<User>()
            .build()
    };
    let mut a = Source::with_registries(
        77,
        Arc::new(GeneratorRegistry::empty()),
        Arc::new(registry()),
    );
    let mut b = Source::with_registries(
        77,
        Arc::new(GeneratorRegistry::empty()),
        Arc::new(registry()),
    );
    assert_eq!(
        a.reflectively::<User>().unwrap(),
        b.reflectively::<User>().unwrap()
    );
}

#[test]
fn derived_types_run_under_the_trial_runner() {
    let structurals = Arc::new(
        StructuralRegistry::builder()
            .structural::<User>()
            .structural::<Status>()
            .structural::<Account>()
            .build(),
    );
    let runner = TrialRunner::with_registries(
        TrialConfig::new().with_seed(31).with_trials(20),
        Arc::new(GeneratorRegistry::empty()),
        structurals,
    );
    let result = runner.run(|source| {
        source.reflectively::<Account>().map_err(TrialError::from)?;
        Ok(())
    });
    assert!(result.is_pass(), "{result}");
}
