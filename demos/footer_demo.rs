//! Footer Demo - PASETO v3.public footers and implicit assertions
//!
//! Footers travel with the token in plain text but are covered by the
//! signature. Implicit assertions are covered by the signature too, but are
//! never transmitted: both sides must supply them.

use paseto_v3::codec::untrusted_footer;
use paseto_v3::{ClaimSet, KeyPair, OsRng, PasetoV3, VerifyOptions, V3_PUBLIC_HEADER};
use time::{Duration, OffsetDateTime};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== PASETO v3.public Footer Demo ===\n");

    let keypair = KeyPair::generate(&mut OsRng)?;

    let mut claims = ClaimSet::new();
    claims.set_subject("user123");
    claims.set_issuer("footer-demo");
    claims.set_expiration(OffsetDateTime::now_utc() + Duration::hours(1));

    // ============================================
    // Part 1: Basic Footer Usage
    // ============================================
    println!("--- Part 1: Basic Footer Usage ---\n");

    let footer = serde_json::to_vec(&serde_json::json!({
        "kid": "signing-key-2030-01",
        "region": "us-east-1",
    }))?;

    let token_with_footer =
        PasetoV3::sign_with_footer(keypair.secret_key(), &claims, Some(footer.as_slice()), None)?;

    println!("Token with footer created");
    println!("Token length: {} bytes", token_with_footer.len());
    println!(
        "Token parts: {} (includes footer)\n",
        token_with_footer.split('.').count()
    );

    // A verifier can read the footer first to pick a key
    if let Some(raw) = untrusted_footer(&token_with_footer, V3_PUBLIC_HEADER)? {
        let meta: serde_json::Value = serde_json::from_slice(&raw)?;
        println!("Unverified footer (key lookup only): kid = {}", meta["kid"]);
    }

    let verified = PasetoV3::verify(keypair.public_key(), &token_with_footer)?;
    if let Some(footer) = verified.footer() {
        println!("Verified footer: {}", String::from_utf8_lossy(footer));
    }
    println!();

    // ============================================
    // Part 2: Footer Tampering
    // ============================================
    println!("--- Part 2: Footer Tampering ---\n");

    let (body, _) = token_with_footer
        .rsplit_once('.')
        .ok_or("token has no footer segment")?;
    let forged_footer = base64_url(br#"{"kid":"attacker-key","region":"us-east-1"}"#);
    let tampered = format!("{body}.{forged_footer}");

    match PasetoV3::verify(keypair.public_key(), &tampered) {
        Ok(_) => println!("ERROR: Tampered footer accepted!"),
        Err(e) => println!("Correct: Tampered footer rejected - {}\n", e),
    }

    // ============================================
    // Part 3: Implicit Assertions
    // ============================================
    println!("--- Part 3: Implicit Assertions ---\n");

    let assertion = b"tenant=org_abc123";
    let bound_token =
        PasetoV3::sign_with_footer(keypair.secret_key(), &claims, None, Some(&assertion[..]))?;

    let options = VerifyOptions::new();
    let verified = PasetoV3::verify_with_options(
        keypair.public_key(),
        &bound_token,
        &options,
        Some(&assertion[..]),
    )?;
    println!(
        "Verified with matching assertion: subject = {:?}",
        verified.claims().subject()
    );

    match PasetoV3::verify_with_options(
        keypair.public_key(),
        &bound_token,
        &options,
        Some(&b"tenant=org_other"[..]),
    ) {
        Ok(_) => println!("ERROR: Wrong assertion accepted!"),
        Err(e) => println!("Correct: Wrong assertion rejected - {}", e),
    }

    println!("\n=== Footer Demo Complete ===");
    Ok(())
}

fn base64_url(bytes: &[u8]) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    URL_SAFE_NO_PAD.encode(bytes)
}
