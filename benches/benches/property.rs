// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_property_engine`.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Once;
use std::{string::String, vec::Vec};

use understory_property_engine::{
    BindingPriority, ErasedValue, Property, PropertyEngine, PropertyMetadataBuilder,
    PropertyRegistry, ValueStore,
};

struct Setup {
    engine: PropertyEngine<u32>,
    width: Property<f64>,
    text: Property<String>,
}

fn setup() -> Setup {
    let mut registry = PropertyRegistry::new();
    let width = registry
        .register("Width", PropertyMetadataBuilder::new(0.0_f64).build())
        .unwrap();
    let text = registry
        .register("Text", PropertyMetadataBuilder::new(String::new()).build())
        .unwrap();
    Setup {
        engine: PropertyEngine::new(registry),
        width,
        text,
    }
}

fn bench_property(c: &mut Criterion) {
    static PRINT_SIZES: Once = Once::new();
    PRINT_SIZES.call_once(|| {
        eprintln!(
            "sizes: ValueStore={} ErasedValue={}",
            core::mem::size_of::<ValueStore>(),
            core::mem::size_of::<ErasedValue>(),
        );
    });

    let mut group = c.benchmark_group("property/resolve");

    group.bench_function("default", |b| {
        let Setup { engine, width, .. } = setup();
        b.iter(|| black_box(engine.get_value(black_box(1), width)))
    });

    group.bench_function("local", |b| {
        let Setup {
            mut engine, width, ..
        } = setup();
        engine
            .set_value(1, width, BindingPriority::LocalValue, 100.0)
            .unwrap();
        b.iter(|| black_box(engine.get_value(black_box(1), width)))
    });

    group.bench_function("animation_over_style", |b| {
        let Setup {
            mut engine, width, ..
        } = setup();
        engine
            .set_value(1, width, BindingPriority::Style, 50.0)
            .unwrap();
        engine
            .set_value(1, width, BindingPriority::Animation, 200.0)
            .unwrap();
        b.iter(|| black_box(engine.get_value(black_box(1), width)))
    });

    group.bench_function("string_clone", |b| {
        let Setup {
            mut engine, text, ..
        } = setup();
        engine
            .set_value(
                1,
                text,
                BindingPriority::LocalValue,
                "hello world hello world hello world".to_string(),
            )
            .unwrap();
        b.iter(|| black_box(engine.get_value(black_box(1), text)))
    });

    group.bench_function("string_ref", |b| {
        let Setup {
            mut engine, text, ..
        } = setup();
        engine
            .set_value(
                1,
                text,
                BindingPriority::LocalValue,
                "hello world hello world hello world".to_string(),
            )
            .unwrap();
        b.iter(|| black_box(engine.get_value_ref(black_box(1), text).map(String::len)))
    });

    group.finish();

    let mut group = c.benchmark_group("property/mutate");

    group.bench_function("set/f64/no_listener", |b| {
        b.iter_batched(
            setup,
            |Setup {
                 mut engine, width, ..
             }| {
                black_box(engine.set_value(1, width, BindingPriority::LocalValue, 123.0));
                black_box(engine);
            },
            BatchSize::SmallInput,
        )
    });

    for listeners in [1_usize, 8] {
        group.bench_function(BenchmarkId::new("set/f64/listeners", listeners), |b| {
            b.iter_batched(
                || {
                    let mut s = setup();
                    for _ in 0..listeners {
                        s.engine
                            .subscribe(1, s.width, |_, n| {
                                black_box(n.new_value::<f64>());
                            })
                            .unwrap();
                    }
                    s
                },
                |Setup {
                     mut engine, width, ..
                 }| {
                    black_box(engine.set_value(1, width, BindingPriority::LocalValue, 123.0));
                    black_box(engine);
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.bench_function("set/string", |b| {
        b.iter_batched(
            setup,
            |Setup {
                 mut engine, text, ..
             }| {
                black_box(engine.set_value(
                    1,
                    text,
                    BindingPriority::LocalValue,
                    String::from("hello world"),
                ));
                black_box(engine);
            },
            BatchSize::SmallInput,
        )
    });

    // Every priority populated, then the winner toggled.
    group.bench_function("toggle_winner/all_priorities", |b| {
        let Setup {
            mut engine, width, ..
        } = setup();
        for (i, priority) in BindingPriority::ALL.into_iter().enumerate() {
            engine.set_value(1, width, priority, i as f64).unwrap();
        }
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let value = if flip { 10.0 } else { 20.0 };
            black_box(engine.set_value(1, width, BindingPriority::Animation, value))
        })
    });

    group.bench_function(BenchmarkId::new("set/objects", 256), |b| {
        let Setup {
            mut engine, width, ..
        } = setup();
        let objects: Vec<u32> = (0..256).collect();
        let mut step = 0.0;
        b.iter(|| {
            step += 1.0;
            for &object in &objects {
                black_box(engine.set_value(object, width, BindingPriority::Style, step)).ok();
            }
        })
    });

    group.finish();

    let mut group = c.benchmark_group("property/reentrant");

    // A listener that follows each style change with a local override, so
    // each outer delivery nests one more delivery for the same pair.
    group.bench_function("style_then_local", |b| {
        let Setup {
            mut engine, width, ..
        } = setup();
        engine
            .subscribe(1, width, move |engine, n| {
                if n.priority() == BindingPriority::Style {
                    let value = n.new_value::<f64>().copied().unwrap_or_default();
                    engine
                        .set_value(n.sender(), width, BindingPriority::LocalValue, value + 1.0)
                        .unwrap();
                }
            })
            .unwrap();
        let mut step = 0.0;
        b.iter(|| {
            step += 1.0;
            black_box(engine.set_value(1, width, BindingPriority::Style, step))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_property);
criterion_main!(benches);
