use criterion::{black_box, criterion_group, criterion_main, Criterion};
use html_core::char_source::StrDecoder;
use html_core::config::ParserOptions;
use html_core::parser::Parser;

fn repeat_fragment(n: usize) -> String {
    let mut out = String::from("<!DOCTYPE html><html><head><title>x</title></head><body>");
    for i in 0..n {
        out.push_str(&format!(
            "<div class=\"row\" id=\"row-{i}\"><p>item &amp; {i} <b>bold<i>nested</b> tail</i></p></div>"
        ));
    }
    out.push_str("<script>var x = '<div>'; // not a tag</script></body></html>");
    out
}

fn run(html: &str) {
    let mut parser = Parser::new(Box::new(StrDecoder::new(html)), ParserOptions::default());
    while parser.next_event().is_some() {}
}

fn bench_scan_document(c: &mut Criterion) {
    let small = repeat_fragment(50);
    let large = repeat_fragment(2_000);

    let mut group = c.benchmark_group("scan_document");
    group.bench_function("small_document", |b| b.iter(|| run(black_box(&small))));
    group.bench_function("large_document", |b| b.iter(|| run(black_box(&large))));
    group.finish();
}

criterion_group!(benches, bench_scan_document);
criterion_main!(benches);
