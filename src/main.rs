use std::{env, process};

use anyhow::Context;
use log::{error, info};
use server::ServerConfig;
use trainer::TrainerConfig;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <train|serve>");
    process::exit(1);
}

fn train() -> anyhow::Result<()> {
    let config = TrainerConfig::from_env()?;
    let report = trainer::run(&config).context("training failed")?;

    info!(
        "trained on {} samples, held out {}: MSE {:.4}, R2 {:.4}, saved to {}",
        report.train_samples,
        report.test_samples,
        report.mse,
        report.r2,
        report.model_path.display()
    );
    Ok(())
}

fn serve() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start the async runtime")?;

    runtime.block_on(server::serve(config))?;
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("house-price", String::as_str);

    let result = match args.get(1).map(String::as_str) {
        Some("train") => train(),
        Some("serve") => serve(),
        _ => usage(program),
    };

    if let Err(e) = result {
        error!("{e:#}");
        process::exit(1);
    }
}
