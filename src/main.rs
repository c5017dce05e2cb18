// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Dispatch to the appropriate subcommand handler
// 4. Print / export the report
// 5. Exit with proper code (0 = success, 1 = broken links, 2 = error)
// =============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use doc_link_guardian::cli::{CheckArgs, Cli, Commands, NetworkArgs};
use doc_link_guardian::config::VerifyConfig;
use doc_link_guardian::crawl::discover_html_files;
use doc_link_guardian::{logging, report, HttpProbe, StopSignal, Verifier};
use tracing::warn;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err = unexpected error (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match cli.command {
        Commands::Check(args) => handle_check(args).await,
        Commands::Url { url, json, network } => handle_url(&url, json, &network).await,
    }
}

// Handles the 'check' subcommand
async fn handle_check(args: CheckArgs) -> Result<i32> {
    let config = args.to_config();

    let documents = if args.files.is_empty() {
        discover_html_files(&config.build_root)
            .with_context(|| format!("Cannot scan {}", config.build_root.display()))?
    } else {
        args.files.clone()
    };

    if documents.is_empty() {
        println!("⚠️  No HTML files found in {}", config.build_root.display());
        return Ok(0);
    }

    eprintln!("🔍 Verifying {} page(s) in {}", documents.len(), config.build_root.display());

    // First Ctrl-C: no new probes, in-flight ones finish their current
    // attempt and the partial report is printed. Second Ctrl-C: exit now.
    let stop = StopSignal::new();
    let on_interrupt = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("interrupt received; finishing in-flight checks (Ctrl-C again to abort)");
        on_interrupt.stop();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Aborted");
            std::process::exit(130);
        }
    });

    let build_root = config.build_root.clone();
    let verifier = Verifier::with_http(config, stop)?;
    let result = verifier.run(&documents).await;

    // "--json -" owns stdout; the text summary would corrupt it
    if args.json.as_deref() != Some("-") {
        report::print_text(&result, &build_root);
    }
    if let Some(destination) = &args.json {
        report::write_json(&result, destination)?;
    }
    if let Some(path) = &args.csv {
        report::write_csv(&result, path)?;
    }

    Ok(if result.has_broken() { 1 } else { 0 })
}

// Handles the 'url' subcommand
async fn handle_url(url: &str, json: bool, network: &NetworkArgs) -> Result<i32> {
    let mut config = VerifyConfig::default();
    network.apply(&mut config);

    let probe = HttpProbe::new(&config)?;
    let result = probe.check_url(url).await;
    report::print_probe_result(url, &result, json)?;

    Ok(if result.reachable { 0 } else { 1 })
}
