use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use noesis::bag::{Bag, Item};
use noesis::budget::BudgetValue;
use noesis::event::NullSink;
use noesis::rules::Syllogism;
use noesis::{Memory, Parameters};

struct Sample {
    key: String,
    budget: BudgetValue,
}

impl Item for Sample {
    fn key(&self) -> &str {
        &self.key
    }
    fn budget(&self) -> &BudgetValue {
        &self.budget
    }
    fn budget_mut(&mut self) -> &mut BudgetValue {
        &mut self.budget
    }
}

fn filled_bag(n: usize) -> Bag<Sample> {
    let mut bag = Bag::new(n, 100, 10.0);
    for i in 0..n {
        let priority = (i % 100) as f32 / 100.0;
        let budget = BudgetValue::new(priority, 0.5, 0.5).unwrap().with_visit(0);
        bag.put_in(Sample { key: format!("item{i}"), budget });
    }
    bag
}

fn primed_memory() -> Memory {
    let mut memory = Memory::new(Parameters::default()).unwrap().with_rules(Syllogism).with_sink(NullSink);
    for i in 0..20 {
        memory.input(&format!("<a{i} --> a{}>.", i + 1)).unwrap();
    }
    memory.input("<a0 --> a20>?").unwrap();
    memory.run(10);
    memory
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);

    let mut bag = filled_bag(1000);
    c.bench_function("bag take/put 1k", |b| {
        b.iter(|| {
            let item = bag.take_out(&mut rng).unwrap();
            black_box(bag.put_in(item));
        })
    });

    let mut bag = filled_bag(100_000);
    c.bench_function("bag take/put 100k", |b| {
        b.iter(|| {
            let item = bag.take_out(&mut rng).unwrap();
            black_box(bag.put_in(item));
        })
    });

    let mut bag = filled_bag(1000);
    let mut now = 0;
    c.bench_function("bag take/put back with forgetting", |b| {
        b.iter(|| {
            now += 1;
            let item = bag.take_out(&mut rng).unwrap();
            black_box(bag.put_back(item, now));
        })
    });

    let mut memory = primed_memory();
    c.bench_function("memory cycle", |b| b.iter(|| memory.cycle()));

    c.bench_function("input and 100 cycles", |b| {
        b.iter(|| {
            let mut memory = primed_memory();
            memory.run(black_box(100));
            black_box(memory.concepts().len())
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
