mod repeat;

use criterion::criterion_group;

criterion_group!(benches, repeat::basic, repeat::scope);
