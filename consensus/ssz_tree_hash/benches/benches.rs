use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use ssz_codec::{SszType, SszValue};
use ssz_tree_hash::{hash_tree_root, MerkleHasher};

fn validator_type() -> SszType {
    SszType::container([
        ("pubkey", SszType::byte_vector(48)),
        ("withdrawal_credentials", SszType::byte_vector(32)),
        ("effective_balance", SszType::uint64()),
        ("slashed", SszType::Bool),
        ("activation_eligibility_epoch", SszType::uint64()),
        ("activation_epoch", SszType::uint64()),
        ("exit_epoch", SszType::uint64()),
        ("withdrawable_epoch", SszType::uint64()),
    ])
}

fn validator(i: usize) -> SszValue {
    let mut pubkey = [0; 48];
    pubkey[..8].copy_from_slice(&(i as u64).to_le_bytes());

    SszValue::Container(vec![
        SszValue::byte_vector(&pubkey),
        SszValue::byte_vector(&[i as u8; 32]),
        32_000_000_000u64.into(),
        false.into(),
        0u64.into(),
        0u64.into(),
        u64::max_value().into(),
        u64::max_value().into(),
    ])
}

fn all_benches(c: &mut Criterion) {
    let validator_count = 16_384;
    let registry_type = SszType::list(validator_type(), 1 << 40);
    let registry = SszValue::List((0..validator_count).map(validator).collect());
    let registry_bytes = registry_type.encode(&registry).expect("should encode");

    let mut group = c.benchmark_group(format!("{}_validators", validator_count));
    group.sample_size(10);

    group.bench_function("encode/validators", |b| {
        b.iter(|| black_box(registry_type.encode(&registry).expect("should encode")))
    });

    group.bench_function("decode/validators", |b| {
        b.iter(|| black_box(registry_type.decode(&registry_bytes).expect("should decode")))
    });

    group.bench_function("tree_hash/validators", |b| {
        b.iter(|| black_box(hash_tree_root(&registry_type, &registry).expect("should hash")))
    });

    let balances_type = SszType::list(SszType::uint64(), 1 << 40);
    let balances = SszValue::List(
        (0..validator_count as u64)
            .map(SszValue::from)
            .collect(),
    );
    group.bench_function("tree_hash/balances", |b| {
        b.iter(|| black_box(hash_tree_root(&balances_type, &balances).expect("should hash")))
    });

    group.bench_function("merkle_hasher/1mb", |b| {
        b.iter_batched(
            || vec![42; 1 << 20],
            |bytes| {
                let mut hasher = MerkleHasher::with_leaves(bytes.len() / 32).expect("should build");
                hasher.write(&bytes).expect("should write");
                black_box(hasher.finish().expect("should finish"))
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, all_benches);
criterion_main!(benches);
