use anyhow::Context;
use clap::Parser;
use meal_lens::app::{build_resolver, build_vision_analyzer, run_batch_files};
use meal_lens::utils::error::ErrorSeverity;
use meal_lens::utils::{logger, validation::Validate};
use meal_lens::{AppConfig, CliConfig, Command, Locale, MealLensError};

fn load_config(cli: &CliConfig) -> meal_lens::Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            AppConfig::from_file(path)?
        }
        None => AppConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

async fn run(cli: &CliConfig, config: &AppConfig) -> anyhow::Result<()> {
    match &cli.command {
        Command::Text {
            description,
            locale,
        } => {
            let resolver = build_resolver(config)?;
            let estimate = match locale {
                Some(code) => {
                    resolver
                        .resolve_from_text_with_locale(description, &Locale::new(code.as_str()))
                        .await?
                }
                None => resolver.resolve_from_text(description).await?,
            };
            println!("{}", serde_json::to_string_pretty(&estimate)?);
        }
        Command::Image { path } => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading image {}", path.display()))?;
            let resolver = build_resolver(config)?;
            let estimate = resolver.resolve_from_image(&bytes).await?;
            println!("{}", serde_json::to_string_pretty(&estimate)?);
        }
        Command::Vision { path } => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading image {}", path.display()))?;
            let analyzer = build_vision_analyzer(config)?;
            let analysis = analyzer.analyze(&bytes).await;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Command::Probe => {
            let analyzer = build_vision_analyzer(config)?;
            if analyzer.test_connection().await {
                println!("✅ ok");
            } else {
                println!("❌ unreachable");
            }
        }
        Command::Batch { input, output } => {
            let resolver = build_resolver(config)?;
            let summary = run_batch_files(&resolver, input, output).await?;
            println!(
                "✅ {} rows processed ({} resolved, {} failed)",
                summary.total, summary.resolved, summary.failed
            );
            println!("📁 Output saved to: {}", output.display());
        }
    }
    Ok(())
}

fn report(e: &MealLensError) -> i32 {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting meal-lens CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            std::process::exit(report(&e));
        }
    };

    if let Err(e) = run(&cli, &config).await {
        let code = match e.downcast_ref::<MealLensError>() {
            Some(err) => report(err),
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                3
            }
        };
        std::process::exit(code);
    }
}
