use anyhow::Context;
use clap::Parser;
use prost::Message;
use prost_types::FileDescriptorSet;
use protoc_gen_grpcx::utils::error::ErrorSeverity;
use protoc_gen_grpcx::utils::{logger, validation::Validate};
use protoc_gen_grpcx::{generate_descriptor_set, CliConfig};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("🚀 Starting grpcx-gen");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let bytes = std::fs::read(&config.descriptor_set).with_context(|| {
        format!(
            "couldn't read descriptor set '{}'",
            config.descriptor_set.display()
        )
    })?;
    let set = FileDescriptorSet::decode(bytes.as_slice()).with_context(|| {
        format!(
            "couldn't parse '{}' as a FileDescriptorSet, build it with `protoc -o`",
            config.descriptor_set.display()
        )
    })?;
    tracing::info!("📁 Loaded {} descriptor(s)", set.file.len());

    let manifest = match generate_descriptor_set(&config, set) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::error!(
                "❌ Generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

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

    if config.dry_run {
        println!("{}", manifest.to_json()?);
        return Ok(());
    }

    println!(
        "✅ Generated {} file(s) under {}",
        manifest.files.len(),
        manifest.out
    );
    Ok(())
}
