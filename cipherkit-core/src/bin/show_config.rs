use cipherkit_core::shared::constants::*;
use cipherkit_core::CryptoConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    cipherkit_core::init();
    let config = match CryptoConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("{} {} Crypto Configuration:\n", cipherkit_core::NAME, cipherkit_core::VERSION);
    println!("  Default Key Size ({}): {} bits", ENV_DEFAULT_KEY_SIZE, config.default_key_size);
    println!("  Stream Buffer Size ({}): {} bytes", ENV_STREAM_BUFFER_SIZE, config.stream_buffer_size);
    println!("  Signature Digest ({}): {}", ENV_SIGNATURE_DIGEST, config.signature_digest);
    println!("  PBE Iterations ({}): {}", ENV_PBE_ITERATIONS, config.pbe_iterations);
    println!(
        "  Signature Algorithm: {}withRSA",
        config.signature_digest.signature_prefix()
    );
    ExitCode::SUCCESS
}
