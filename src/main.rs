use protoc_gen_grpcx::utils::error::ErrorSeverity;
use protoc_gen_grpcx::utils::logger;
use std::io::{Read, Write};

fn main() {
    logger::init_cli_logger(logger::verbose_from_env());

    if let Some(flag) = std::env::args().nth(1) {
        if flag == "--version" || flag == "-V" {
            println!("protoc-gen-grpcx {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    }

    let mut input = Vec::new();
    if let Err(e) = std::io::stdin().lock().read_to_end(&mut input) {
        tracing::error!("Couldn't read CodeGeneratorRequest from stdin: {}", e);
        std::process::exit(1);
    }
    tracing::debug!("Read {} byte(s) from protoc", input.len());

    let output = match protoc_gen_grpcx::run(&input) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("❌ {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(&output).and_then(|_| stdout.flush()) {
        tracing::error!("Couldn't write CodeGeneratorResponse to stdout: {}", e);
        std::process::exit(3);
    }
}
