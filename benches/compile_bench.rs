use std::fmt::Write;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use storyscript::{Bundle, CompileOptions, Story};

fn build_story(blocks: usize) -> String {
    let mut src = String::new();

    let _ = writeln!(src, "function double n:int returns int");
    let _ = writeln!(src, "    return n * 2");
    for i in 0..blocks {
        let _ = writeln!(src, "items_{i} = [1, 2, {i}]");
        let _ = writeln!(src, "count_{i} = items_{i} length");
        let _ = writeln!(src, "label_{i} = \"item {{count_{i}}} of {i}\"");
        let _ = writeln!(src, "if count_{i} > 2");
        let _ = writeln!(src, "    reply_{i} = http fetch url:label_{i}");
        let _ = writeln!(src, "else");
        let _ = writeln!(src, "    total_{i} = double(n: count_{i}) + 1");
        let _ = writeln!(src, "foreach items_{i} as item");
        let _ = writeln!(src, "    sum_{i} = item + (items_{i} length)");
    }

    src
}

fn bench_story_compile(c: &mut Criterion) {
    let options = CompileOptions::new();
    let mut group = c.benchmark_group("compile/story");

    for blocks in [10usize, 100, 1_000] {
        let story = Story::from_string(build_story(blocks));
        group.throughput(Throughput::Bytes(story.source().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &story, |b, story| {
            b.iter(|| {
                let result = black_box(story).compile(&options);
                assert!(result.is_success());
                black_box(result);
            });
        });
    }

    group.finish();
}

fn bench_bundle_compile(c: &mut Criterion) {
    let options = CompileOptions::new();
    let mut group = c.benchmark_group("compile/bundle");

    for stories in [4usize, 32] {
        let bundle = Bundle::from_map(
            (0..stories).map(|i| (format!("story_{i}.story"), build_story(100))),
        );
        group.bench_with_input(BenchmarkId::from_parameter(stories), &bundle, |b, bundle| {
            b.iter(|| {
                let result = black_box(bundle).compile(&options);
                black_box(result.result(false).expect("bundle document"));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_story_compile, bench_bundle_compile);
criterion_main!(benches);
