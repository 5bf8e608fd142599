use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use paseto_v3::pae::pae_encode;
use paseto_v3::{ClaimSet, KeyPair, PasetoV3, PublicKey, SecretKey, VerifyOptions};
use rand::thread_rng;
use std::hint::black_box;
use time::{Duration, OffsetDateTime};

fn simple_claims() -> ClaimSet {
    let mut claims = ClaimSet::new();
    claims.set_subject("user123");
    claims.set_issuer("auth-service");
    claims.set_audience("api.example.com");
    claims.set_expiration(OffsetDateTime::now_utc() + Duration::hours(1));
    claims
}

fn complex_claims() -> ClaimSet {
    let now = OffsetDateTime::now_utc();
    let mut claims = simple_claims();
    claims.set_token_id("unique-token-id-123456789");
    claims.set_not_before(now);
    claims.set_issued_at(now);
    claims.insert("tenant_id", "org_abc123456789").unwrap();
    claims
        .insert("roles", serde_json::json!(["user", "admin", "reader", "writer"]))
        .unwrap();
    claims
        .insert(
            "metadata",
            serde_json::json!({
                "client_version": "1.0.0",
                "platform": "linux",
                "features": ["p384", "footer", "implicit-assertion"]
            }),
        )
        .unwrap();
    claims
}

fn keypair_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("keypair_generation");

    group.bench_function("p384_keygen", |b| {
        let mut rng = thread_rng();
        b.iter(|| black_box(KeyPair::generate(&mut rng).unwrap()))
    });

    group.finish();
}

fn token_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_signing");
    let keypair = KeyPair::generate(&mut thread_rng()).unwrap();

    let simple = simple_claims();
    let complex = complex_claims();

    group.bench_function("simple_claims", |b| {
        b.iter(|| black_box(PasetoV3::sign(keypair.secret_key(), &simple).unwrap()))
    });

    group.bench_function("complex_claims", |b| {
        b.iter(|| black_box(PasetoV3::sign(keypair.secret_key(), &complex).unwrap()))
    });

    group.bench_function("with_footer_and_assertion", |b| {
        b.iter(|| {
            black_box(
                PasetoV3::sign_with_footer(
                    keypair.secret_key(),
                    &simple,
                    Some(&b"{\"kid\":\"bench-key-001\"}"[..]),
                    Some(&b"tenant=bench"[..]),
                )
                .unwrap(),
            )
        })
    });

    group.finish();
}

fn token_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_verification");
    let keypair = KeyPair::generate(&mut thread_rng()).unwrap();

    let simple_token = PasetoV3::sign(keypair.secret_key(), &simple_claims()).unwrap();
    let complex_token = PasetoV3::sign(keypair.secret_key(), &complex_claims()).unwrap();

    group.bench_function("simple_token", |b| {
        b.iter(|| black_box(PasetoV3::verify(keypair.public_key(), &simple_token).unwrap()))
    });

    group.bench_function("complex_token", |b| {
        b.iter(|| black_box(PasetoV3::verify(keypair.public_key(), &complex_token).unwrap()))
    });

    let options = VerifyOptions::new()
        .with_issuer("auth-service")
        .with_audience("api.example.com");
    group.bench_function("with_issuer_and_audience", |b| {
        b.iter(|| {
            black_box(
                PasetoV3::verify_with_options(keypair.public_key(), &simple_token, &options, None)
                    .unwrap(),
            )
        })
    });

    // Rejection cost for a token signed by someone else
    let other = KeyPair::generate(&mut thread_rng()).unwrap();
    group.bench_function("wrong_key_rejection", |b| {
        b.iter(|| black_box(PasetoV3::verify(other.public_key(), &simple_token).unwrap_err()))
    });

    group.finish();
}

fn token_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_sizes");
    let keypair = KeyPair::generate(&mut thread_rng()).unwrap();

    for size in [100, 1000, 10000] {
        let mut claims = simple_claims();
        claims.insert("large_field", "x".repeat(size)).unwrap();
        let token = PasetoV3::sign(keypair.secret_key(), &claims).unwrap();

        group.throughput(Throughput::Bytes(token.len() as u64));
        group.bench_with_input(BenchmarkId::new("verify_by_size", size), &token, |b, token| {
            b.iter(|| black_box(PasetoV3::verify(keypair.public_key(), token).unwrap()))
        });
    }

    group.finish();
}

fn key_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_serialization");
    let keypair = KeyPair::generate(&mut thread_rng()).unwrap();

    let secret_bytes = keypair.secret_key().to_bytes();
    let public_bytes = keypair.public_key().to_bytes();

    group.bench_function("secret_key_import", |b| {
        b.iter(|| black_box(SecretKey::from_bytes(&secret_bytes[..]).unwrap()))
    });

    group.bench_function("public_key_import", |b| {
        b.iter(|| black_box(PublicKey::from_bytes(&public_bytes).unwrap()))
    });

    group.bench_function("public_key_derivation", |b| {
        b.iter(|| black_box(keypair.secret_key().public_key()))
    });

    group.finish();
}

fn pae_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pae");

    let public_key = [0x02u8; 49];
    let message = vec![b'{'; 512];
    group.bench_function("pae_v3_public", |b| {
        b.iter(|| {
            black_box(
                pae_encode(&[&public_key, b"v3.public.", &message, b"", b""]).unwrap(),
            )
        })
    });

    let many_pieces: Vec<&[u8]> = (0..100).map(|_| b"small" as &[u8]).collect();
    group.bench_function("pae_many_small_pieces", |b| {
        b.iter(|| black_box(pae_encode(&many_pieces).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    keypair_generation,
    token_signing,
    token_verification,
    token_sizes,
    key_serialization,
    pae_benchmarks
);
criterion_main!(benches);
