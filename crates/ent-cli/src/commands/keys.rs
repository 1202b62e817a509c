//! Key management commands.

use super::print_json;
use anyhow::{Context, Result};
use colored::Colorize;
use ent_prov::{keygen, SigningContext};
use std::fs;
use std::path::PathBuf;

/// Generate a fresh Ed25519 keypair in DER/base64 form.
pub fn cmd_keygen(output: Option<PathBuf>, json: bool) -> Result<()> {
    let material = keygen().context("failed to generate keypair")?;
    let keypair = serde_json::json!({
        "private_key_der_base64": material.private_key_der_base64,
        "public_key_der_base64": material.public_key_der_base64,
    });

    if let Some(path) = output {
        let text = serde_json::to_string_pretty(&keypair)?;
        fs::write(&path, text)
            .with_context(|| format!("failed to write keypair to {}", path.display()))?;
        if json {
            print_json(&serde_json::json!({ "written": path }))?;
        } else {
            println!("{} Keypair written to {}", "✓".green(), path.display());
        }
    } else if json {
        print_json(&keypair)?;
    } else {
        println!("{}", "Generated Ed25519 Keypair".bold().underline());
        println!(
            "{}: {}",
            "Private Key (PKCS#8)".bold().red(),
            material.private_key_der_base64
        );
        println!(
            "{}: {}",
            "Public Key (SPKI)".bold().green(),
            material.public_key_der_base64
        );
        println!();
        println!("{}", "WARNING: Keep the private key secret!".yellow().bold());
    }

    Ok(())
}

/// Show the public half of the active signing key.
pub fn cmd_public_key(signing: &SigningContext, json: bool) -> Result<()> {
    let info = signing.public_key_info();
    if json {
        return print_json(&info);
    }

    println!("{}: {}", "Key ID".bold(), info.kid);
    println!("{}: {}", "Algorithm".bold(), info.algorithm);
    println!("{}: {}", "Public Key".bold(), info.public_key);
    Ok(())
}
