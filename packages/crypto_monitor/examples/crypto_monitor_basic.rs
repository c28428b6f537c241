//! Measures a few simulated cryptographic operations and prints the derived reports.
//!
//! The workloads here are stand-ins. In real use the monitor calls bracket actual
//! encryption, signing or hashing code.
//!
//! Run with: `cargo run --example crypto_monitor_basic`.
#![expect(
    clippy::arithmetic_side_effects,
    reason = "this is example code that does not need production-level safety"
)]

use std::hint::black_box;

use crypto_monitor::{Monitor, OperationKind, RsaStep};

const AES_ROUNDS: u64 = 10;

fn main() {
    let mut monitor = Monitor::new();

    // AES-128 has 10 rounds. We mark each one so round-to-round timing can be analyzed.
    for block in 0..20_u64 {
        monitor.start(OperationKind::AesEncrypt, 128);

        let mut state = block;
        for round in 0..AES_ROUNDS {
            state = black_box(state.rotate_left(7) ^ round);
            monitor.record_round(OperationKind::AesEncrypt, round);
        }

        monitor.end(OperationKind::AesEncrypt);
    }

    // Square-and-multiply over the bits of a toy exponent.
    let exponent: u64 = 0b1011_0110_1101;
    for _ in 0..5 {
        let id = monitor.start(OperationKind::RsaDecrypt, 2048);

        for bit in (0..u64::BITS - exponent.leading_zeros()).rev() {
            monitor.record_rsa_step(OperationKind::RsaDecrypt, RsaStep::Square);
            monitor.record_rsa_step(OperationKind::RsaDecrypt, RsaStep::Reduce);

            if (exponent >> bit) & 1 == 1 {
                monitor.record_rsa_step(OperationKind::RsaDecrypt, RsaStep::Multiply);
                monitor.record_rsa_step(OperationKind::RsaDecrypt, RsaStep::Reduce);
            }
        }

        monitor
            .end_at(id)
            .expect("the measurement was started just above and nothing superseded it");
    }

    // Name-addressed calls resolve the operation name first.
    monitor
        .start_crypto_operation("SHA256_HASH", 0)
        .expect("SHA256_HASH is a known operation name");
    monitor
        .end_crypto_operation("SHA256_HASH")
        .expect("SHA256_HASH is a known operation name");

    match monitor.start_crypto_operation("AES-256", 256) {
        Ok(_) => println!("AES-256 was accepted"),
        Err(error) => println!("AES-256 was rejected: {error}"),
    }
    println!();

    monitor.print_to_stdout();
}
