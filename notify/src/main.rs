// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later
//
// dchook-notify: sends an authenticated deployment webhook.
//
// Wraps the payload in a timestamped envelope, signs the serialized
// envelope with HMAC-SHA2 and POSTs it to the receiver. The exit code
// reflects the receiver's answer so deploy scripts can branch on it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use dchook_common::{
    generate_signature, payload_from_bytes, Algorithm, BuildInfo, Envelope, MAX_PAYLOAD_SIZE,
    SIGNATURE_HEADER,
};
use reqwest::StatusCode;
use tokio::io::AsyncReadExt;
use tracing::debug;
use url::Url;

mod exit;

use exit::Exit;

#[derive(Parser)]
#[command(
    name = "dchook-notify",
    about = "Send authenticated webhook to dchook listener",
    after_help = "DCHOOK_ALGORITHM defaults to sha256 and must be allowed by the receiver."
)]
struct Args {
    /// Webhook endpoint URL
    #[arg(short = 'u', long, env = "DCHOOK_URL")]
    url: Option<String>,

    /// Path to webhook secret file
    #[arg(short = 's', long, env = "DCHOOK_SECRET_FILE")]
    secret_file: Option<PathBuf>,

    /// Hash algorithm (sha256, sha384, sha512)
    #[arg(short = 'a', long, env = "DCHOOK_ALGORITHM", default_value = "sha256")]
    algorithm: String,

    /// Quiet mode (suppress output, return only exit code)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Show version information
    #[arg(long)]
    version: bool,

    /// Path to JSON payload file (use '-' for stdin)
    body_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();
    let build = BuildInfo::current();

    if args.version {
        println!("dchook-notify v{} (commit: {})", build.version, build.commit);
        return ExitCode::SUCCESS;
    }

    let quiet = args.quiet;
    match run(args, &build).await {
        Ok(message) => {
            if !quiet {
                println!("{}", message);
            }
            ExitCode::SUCCESS
        }
        Err(exit) => {
            if !quiet {
                eprintln!("{}", exit);
            }
            exit.code()
        }
    }
}

async fn run(args: Args, build: &BuildInfo) -> Result<String, Exit> {
    let body_file = args.body_file.ok_or_else(|| {
        Exit::Config("a body file argument is required (use '-' for stdin)".into())
    })?;
    let url = args
        .url
        .ok_or_else(|| Exit::Config("DCHOOK_URL environment variable or -u flag is required".into()))?;
    let url = Url::parse(&url).map_err(|e| Exit::Config(format!("invalid URL {}: {}", url, e)))?;
    let secret_file = args.secret_file.ok_or_else(|| {
        Exit::Config("DCHOOK_SECRET_FILE environment variable or -s flag is required".into())
    })?;
    let algorithm: Algorithm = args
        .algorithm
        .parse()
        .map_err(|e| Exit::Config(format!("{}", e)))?;

    let secret = tokio::fs::read_to_string(&secret_file)
        .await
        .map_err(|e| Exit::Config(format!("error reading secret file: {}", e)))?;
    let secret = secret.trim();

    let raw = read_payload(&body_file).await?;
    let payload = payload_from_bytes(&raw).map_err(|e| Exit::Payload(e.to_string()))?;

    let envelope = Envelope::new(build.version, build.commit, Utc::now().timestamp_micros(), payload);
    let body = envelope
        .to_vec()
        .map_err(|e| Exit::Payload(format!("error marshaling envelope: {}", e)))?;
    let signature = generate_signature(&body, secret, algorithm.as_str())
        .ok_or_else(|| Exit::Config(format!("unsupported algorithm {}", algorithm)))?;

    debug!(url = %url, algorithm = %algorithm, bytes = body.len(), "Sending webhook");

    let response = reqwest::Client::new()
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .header(SIGNATURE_HEADER, signature)
        .body(body)
        .send()
        .await
        .map_err(|e| Exit::Request(format!("error sending webhook: {}", e)))?;

    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    if status == StatusCode::ACCEPTED {
        let mut message = format!("✓ Webhook accepted (status: {})", status.as_u16());
        if !text.is_empty() {
            message.push_str(&format!("\nResponse: {}", text.trim_end()));
        }
        Ok(message)
    } else {
        Err(Exit::Rejected {
            status: status.as_u16(),
            body: text,
        })
    }
}

/// Read at most one byte past the payload limit, from a file or stdin.
async fn read_payload(path: &Path) -> Result<Vec<u8>, Exit> {
    let limit = MAX_PAYLOAD_SIZE as u64 + 1;
    let mut raw = Vec::new();

    if path.as_os_str() == "-" {
        tokio::io::stdin()
            .take(limit)
            .read_to_end(&mut raw)
            .await
            .map_err(|e| Exit::Payload(format!("error reading stdin: {}", e)))?;
    } else {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Exit::Payload(format!("error opening file: {}", e)))?;
        file.take(limit)
            .read_to_end(&mut raw)
            .await
            .map_err(|e| Exit::Payload(format!("error reading file: {}", e)))?;
    }

    if raw.len() > MAX_PAYLOAD_SIZE {
        return Err(Exit::Payload("payload exceeds 1MiB limit".into()));
    }
    Ok(raw)
}
