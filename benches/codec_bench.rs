use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jagpack::archive::Archive;
use jagpack::wire;

fn bench_encode(c: &mut Criterion) {
    let mut ar = Archive::new();
    ar.put("data.bin", vec![42u8; 1024 * 1024]);

    c.bench_function("encode_1mb_flat", |b| {
        b.iter(|| wire::encode(black_box(&ar), usize::MAX).unwrap())
    });
    c.bench_function("encode_1mb_bzip2", |b| {
        b.iter(|| wire::encode(black_box(&ar), 0).unwrap())
    });
}

fn bench_decode(c: &mut Criterion) {
    let mut ar = Archive::new();
    ar.put("data.bin", vec![42u8; 1024 * 1024]);
    let flat = wire::encode(&ar, usize::MAX).unwrap();
    let packed = wire::encode(&ar, 0).unwrap();

    c.bench_function("decode_1mb_flat", |b| {
        b.iter(|| wire::decode(black_box(&flat)).unwrap())
    });
    c.bench_function("decode_1mb_bzip2", |b| {
        b.iter(|| wire::decode(black_box(&packed)).unwrap())
    });
}

fn bench_lookup(c: &mut Criterion) {
    let mut ar = Archive::new();
    for i in 0..256 {
        ar.put(&format!("entry_{i}.bin"), vec![i as u8; 64]);
    }

    c.bench_function("get_last_of_256", |b| {
        b.iter(|| ar.get(black_box("entry_255.bin")))
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_lookup);
criterion_main!(benches);
