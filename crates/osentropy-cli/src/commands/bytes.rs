use std::io::Write;

pub fn run(count: usize, nonblock: bool, raw: bool) {
    let mut buf = vec![0u8; count];
    let result = if nonblock {
        osentropy_core::urandom_nonblock(&mut buf)
    } else {
        osentropy_core::urandom(&mut buf)
    };

    if let Err(e) = result {
        eprintln!("Failed to read {count} random bytes: {e}");
        std::process::exit(1);
    }

    if raw {
        let mut out = std::io::stdout().lock();
        if let Err(e) = out.write_all(&buf).and_then(|()| out.flush()) {
            eprintln!("Failed to write output: {e}");
            std::process::exit(1);
        }
    } else {
        println!("{}", super::hex(&buf));
    }
}
