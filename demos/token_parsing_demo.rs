//! Token Parsing Demo for PASETO v3.public
//!
//! Shows how to look inside a token without verifying it (for logging and
//! key lookup), and how each class of malformed input is reported.
//!
//! Run with: cargo run --example token_parsing_demo

use paseto_v3::codec::{decode, untrusted_footer};
use paseto_v3::{ClaimSet, KeyPair, OsRng, PasetoError, PasetoV3, V3_PUBLIC_HEADER};
use time::OffsetDateTime;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 PASETO v3.public Token Parsing Demo\n");

    let keypair = KeyPair::generate(&mut OsRng)?;

    let mut claims = ClaimSet::new();
    claims.set_subject("demo_user_12345");
    claims.set_issuer("auth-service");
    claims.set_expiration(OffsetDateTime::now_utc() + time::Duration::hours(1));
    claims.insert("role", "admin")?;

    let token = PasetoV3::sign_with_footer(
        keypair.secret_key(),
        &claims,
        Some(&b"{\"kid\":\"demo-key-2030\"}"[..]),
        None,
    )?;

    println!("📋 Token Structure:");
    println!("{}", "=".repeat(60));
    let decoded = decode(&token, V3_PUBLIC_HEADER)?;
    println!("  Header: {}", V3_PUBLIC_HEADER);
    println!("  Message size: {} bytes", decoded.message().len());
    println!("  Signature size: {} bytes", decoded.signature().len());
    println!("  Total size: {} bytes", token.len());
    if let Some(footer) = untrusted_footer(&token, V3_PUBLIC_HEADER)? {
        println!("  Footer (unverified): {}", String::from_utf8_lossy(&footer));
    }

    println!("\n🚦 Error Handling:");
    println!("{}", "=".repeat(60));

    let payload_only = token
        .split_once('.')
        .and_then(|(_, rest)| rest.split_once('.'))
        .map(|(_, rest)| rest.split('.').next().unwrap_or_default().to_string())
        .unwrap_or_default();

    let cases = [
        ("wrong version", token.replacen("v3.", "v2.", 1)),
        ("padding", format!("{V3_PUBLIC_HEADER}{payload_only}==")),
        ("standard alphabet", format!("{V3_PUBLIC_HEADER}{}", "+/".repeat(70))),
        ("truncated", format!("{V3_PUBLIC_HEADER}AAAA")),
        ("extra segment", format!("{token}.extra")),
    ];

    for (label, candidate) in &cases {
        match PasetoV3::verify(keypair.public_key(), candidate) {
            Ok(_) => println!("  ❌ {label}: unexpectedly accepted"),
            Err(e) => println!("  ✅ {label}: {} ({})", kind(&e), e),
        }
    }

    println!("\n✅ Token parsing demo completed successfully!");
    Ok(())
}

fn kind(err: &PasetoError) -> &'static str {
    match err {
        PasetoError::HeaderMismatch { .. } => "HeaderMismatch",
        PasetoError::MalformedEncoding(_) => "MalformedEncoding",
        PasetoError::PayloadTooShort { .. } => "PayloadTooShort",
        PasetoError::SignatureInvalid => "SignatureInvalid",
        _ => "Other",
    }
}
