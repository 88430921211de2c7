use anyhow::Context;
use clap::Parser;

use code_reviewer::args::Args;
use code_reviewer::config::AppConfig;
use code_reviewer::logging::init_logging;
use code_reviewer::server::serve;
use code_reviewer::tools::probe_tools;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.logging_config())?;

    let mut config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    if args.check_tools {
        let mut all_found = true;
        for status in probe_tools(&config.tools).await {
            match status.detail {
                Ok(version) => println!("✅ {:<12} {:<10} {}", status.name, status.program, version),
                Err(reason) => {
                    all_found = false;
                    println!("❌ {:<12} {:<10} {}", status.name, status.program, reason);
                }
            }
        }
        if !all_found {
            println!("Missing tools are reported as *_MISSING issues in review results.");
        }
        return Ok(());
    }

    serve(config).await?;
    Ok(())
}
