use osentropy_core::{Entropy, HashSeed};

pub fn run(seed: Option<&str>) {
    let ctx = Entropy::new();
    let result = match seed {
        Some(s) => s.parse::<HashSeed>().and_then(|seed| ctx.init_secret_with(seed)),
        None => ctx.init_secret(),
    };

    let secret = match result {
        Ok(secret) => secret,
        Err(e) => {
            eprintln!("Fatal error: {e}");
            std::process::exit(1);
        }
    };

    let (k0, k1) = secret.siphash_keys();
    println!("Secret:     {}", super::hex(secret.as_bytes()));
    println!("SipHash k0: {k0:#018x}");
    println!("SipHash k1: {k1:#018x}");
    println!("Salt:       {:#018x}", secret.salt());
    println!("Randomized: {}", secret.is_randomized());
}
