use std::error::Error;
use std::fs;
use std::path::Path;
use std::process;

use clap::Parser;
use log::info;
use tondo::license;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory to scan
    #[arg(short, long, default_value = ".")]
    path: String,

    /// File for the JSON results
    #[arg(short, long, default_value = "license_scan_results.json")]
    out: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Scanning {} for license issues", args.path);
    let results = license::scan_project(Path::new(&args.path))?;

    println!("{}", license::generate_report(&results));

    fs::write(&args.out, serde_json::to_string_pretty(&results)?)?;
    println!("Full results written to {}", args.out);

    if results.summary.overall_status == license::Status::Blocked {
        process::exit(1);
    }
    Ok(())
}
