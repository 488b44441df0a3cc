use std::hint::black_box;
use std::path::Path;

use claude_bushwack::parsers::parse_transcript_bytes;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Generate a synthetic transcript with alternating user and assistant records
fn generate_transcript(num_records: usize) -> Vec<u8> {
    let mut content = String::new();
    for i in 0..num_records {
        let role = if i % 2 == 0 { "user" } else { "assistant" };
        content.push_str(&format!(
            r#"{{"parentUuid":null,"type":"{role}","sessionId":"550e8400-e29b-41d4-a716-446655440000","cwd":"/Users/test/project","gitBranch":"main","timestamp":"2024-01-15T10:{:02}:00Z","message":{{"role":"{role}","content":"Message {i} with some content about the parser"}}}}"#,
            i % 60
        ));
        content.push('\n');
        // Roughly one damaged line per thousand
        if i % 1000 == 999 {
            content.push_str("{\"type\":\"user\",\"message\":\n");
        }
    }
    content.into_bytes()
}

fn bench_parse_transcript(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_transcript");

    for size in [100, 1_000, 10_000].iter() {
        let content = generate_transcript(*size);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &content, |b, content| {
            b.iter(|| parse_transcript_bytes(black_box(content), Path::new("bench.jsonl")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_transcript);
criterion_main!(benches);
