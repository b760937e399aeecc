use std::time::Instant;

use osentropy_core::quality::{shannon, unique_values};
use serde::Serialize;

#[derive(Serialize)]
struct ProbeReport {
    version: &'static str,
    os: &'static str,
    backend: String,
    syscall_usable: Option<bool>,
    samples: usize,
    shannon_entropy: f64,
    unique_values: usize,
    elapsed_us: u128,
}

pub fn run(samples: usize, json: bool) {
    let ctx = osentropy_core::global();

    let mut data = vec![0u8; samples];
    let t0 = Instant::now();
    if let Err(e) = ctx.urandom(&mut data) {
        eprintln!("Backend {} failed: {e}", ctx.backend_kind());
        std::process::exit(1);
    }
    let elapsed = t0.elapsed();

    let report = ProbeReport {
        version: osentropy_core::VERSION,
        os: std::env::consts::OS,
        backend: ctx.backend_kind().to_string(),
        syscall_usable: ctx.reader().syscall_usable(),
        samples,
        shannon_entropy: shannon(&data),
        unique_values: unique_values(&data),
        elapsed_us: elapsed.as_micros(),
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Platform: {} (osentropy {})", report.os, report.version);
    println!("  Backend:         {}", report.backend);
    match report.syscall_usable {
        Some(usable) => println!("  getrandom():     {}", if usable { "usable" } else { "disabled" }),
        None => println!("  getrandom():     n/a"),
    }
    println!("  Samples:         {}", report.samples);
    println!(
        "  Shannon entropy: {:.4} / 8.0 bits",
        report.shannon_entropy
    );
    println!("  Unique values:   {}", report.unique_values);
    println!("  Time:            {:.3}ms", elapsed.as_secs_f64() * 1000.0);
}
