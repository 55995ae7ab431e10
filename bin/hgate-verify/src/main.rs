use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use hgate_attest::policy::{AcceptAny, AllowList, PcrPolicy};
use hgate_core::HgError;
use hgate_image::{split_image, verify_image};
use hgate_store::{fs_backend::FileSystemBackend, CounterStore};
use log::info;
use std::process::ExitCode;

/// Host-side trust verifier for H-Gate devices.
#[derive(Parser)]
#[command(name = "hgate-verify", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify an attestation packet: signature, PCR policy, counter freshness.
    Attest {
        /// Device public key (32 bytes, hex).
        pubkey: String,
        /// Attestation packet bytes (hex).
        packet: String,
        /// Detached Ed25519 signature (64 bytes, hex).
        sig: String,
        /// Directory holding per-device counter records.
        /// Omit for a volatile in-memory store (no replay memory across runs).
        #[arg(long)]
        store: Option<String>,
        /// Golden PCR value (32 bytes hex, repeatable).
        /// Absent = accept any PCR.
        #[arg(long = "golden-pcr")]
        golden_pcr: Vec<String>,
    },
    /// Verify a signed boot image file (100-byte header + payload).
    Image {
        /// Signer public key (32 bytes, hex).
        pubkey: String,
        /// Path to the image file.
        path: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let ok = match cli.command {
        Commands::Attest { pubkey, packet, sig, store, golden_pcr } => {
            run_attest(&pubkey, &packet, &sig, store.as_deref(), &golden_pcr)?
        }
        Commands::Image { pubkey, path } => run_image(&pubkey, &path)?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn run_attest(
    pubkey_hex: &str,
    packet_hex: &str,
    sig_hex: &str,
    store_dir: Option<&str>,
    golden_pcr_hex: &[String],
) -> anyhow::Result<bool> {
    let pubkey = decode_hex("public key", pubkey_hex)?;
    let packet = decode_hex("packet", packet_hex)?;
    let sig = decode_hex("signature", sig_hex)?;

    let mut store = match store_dir {
        Some(dir) => {
            info!("Counter store: {}", dir);
            CounterStore::new(Box::new(
                FileSystemBackend::new(dir).context("opening counter store")?,
            ))
        }
        None => {
            info!("Counter store: in-memory (volatile)");
            CounterStore::in_memory()
        }
    };

    let policy: Box<dyn PcrPolicy> = if golden_pcr_hex.is_empty() {
        Box::new(AcceptAny)
    } else {
        let mut golden = Vec::new();
        for g in golden_pcr_hex {
            golden.push(decode_pcr(g)?);
        }
        Box::new(AllowList::new(golden))
    };

    let result = hgate_attest::verify_attestation(&pubkey, &packet, &sig, &mut store, &*policy);

    if result.valid {
        println!("{}", "Attestation Valid".green().bold());
        println!("   Counter : {}", result.counter);
        println!("   PCR     : {}", hex::encode(result.pcr));
        Ok(true)
    } else {
        report_failure(result.reason);
        Ok(false)
    }
}

fn run_image(pubkey_hex: &str, path: &str) -> anyhow::Result<bool> {
    let pubkey = decode_hex("public key", pubkey_hex)?;
    let image = std::fs::read(path).with_context(|| format!("reading image {}", path))?;

    let result = match split_image(&image) {
        Ok((header, payload)) => verify_image(&pubkey, header, payload),
        Err(e) => hgate_core::ImageResult::rejected(e),
    };

    if result.valid {
        println!("{} {}", "Image Verified:".green().bold(), path);
        println!("   Payload SHA-256: {}", hex::encode(result.payload_sha256));
        Ok(true)
    } else {
        report_failure(result.reason);
        Ok(false)
    }
}

/// Stable diagnostic per error kind. Trust failures are visually distinct
/// from format errors.
fn report_failure(reason: Option<HgError>) {
    let reason = match reason {
        Some(r) => r,
        None => return,
    };
    let msg = match reason {
        HgError::MalformedKeyOrSignature => "Malformed key or signature (wrong length or off-curve).",
        HgError::TruncatedPacket => "Attestation packet too short.",
        HgError::SignatureMismatch => "Signature mismatch. H-Gate trust broken.",
        HgError::CounterRegression => "Counter regression. Replay or rollback attempt.",
        HgError::TruncatedHeader => "Image header too short.",
        HgError::BadMagic => "Bad image magic.",
        HgError::PayloadHashMismatch => "Payload hash mismatch.",
        HgError::PcrRejected => "PCR value refused by policy.",
        HgError::StoreIo => "Counter store I/O failure.",
    };
    if reason.is_trust_failure() {
        eprintln!("{} {}", "CRITICAL:".red().bold(), msg.red());
    } else {
        eprintln!("{} {}", "FAIL:".yellow(), msg);
    }
}

fn decode_hex(what: &str, input: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(input).with_context(|| format!("decoding {} hex", what))
}

fn decode_pcr(input: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = decode_hex("golden PCR", input)?;
    if bytes.len() != 32 {
        bail!("golden PCR must be 32 bytes, got {}", bytes.len());
    }
    Ok(bytes.try_into().unwrap())
}
