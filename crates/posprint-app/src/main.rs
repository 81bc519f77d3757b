// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// posprint — POS terminal printer demo
//
// Entry point. Initialises logging, loads the configuration, connects to the
// platform SDK and runs one command against it.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use posprint_core::error::Result;
use posprint_core::human_errors::humanize_error;

use services::app_services::AppServices;
use services::demos;

/// posprint - print on the built-in thermal printer of a POS terminal
#[derive(Parser, Debug)]
#[command(name = "posprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print density for demo jobs (1-5)
    #[arg(long, global = true, default_value = "3")]
    gray_level: i32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show SDK version, serial number, mileage and printer status
    Status,

    /// Print a message in large bold type with a timestamp
    Text {
        /// Message to print
        message: String,
    },

    /// Print the sample store receipt
    Receipt,

    /// Print a Code 128 barcode
    Barcode,

    /// Print a receipt described by a JSON file ({"items": [...], "options": {...}})
    ReceiptFile {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Reset the paper mileage counter
    ClearMileage,

    /// Show the active configuration
    Config {
        /// Write it to the data directory
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("posprint starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            let human = humanize_error(&e);
            eprintln!("Error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let svc = AppServices::init();
    match cli.command {
        Commands::Config { save } => show_config(&svc, save),
        command => {
            svc.connect().await?;
            run_on_device(&svc, command, cli.gray_level).await
        }
    }
}

async fn run_on_device(svc: &AppServices, command: Commands, gray_level: i32) -> Result<()> {
    let session = svc.session();
    match command {
        Commands::Status => show_status(svc),
        Commands::Text { message } => demos::print_text(session, &message, gray_level).await,
        Commands::Receipt => demos::print_store_receipt(session, gray_level).await,
        Commands::Barcode => demos::print_barcode(session).await,
        Commands::ReceiptFile { path } => demos::print_receipt_file(session, &path).await,
        Commands::ClearMileage => {
            session.clear_printer_mileage()?;
            println!("Mileage cleared");
            Ok(())
        }
        Commands::Config { save } => show_config(svc, save),
    }
}

fn show_config(svc: &AppServices, save: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(svc.config())?);
    if save {
        let path = svc.save_config()?;
        println!("saved to {}", path.display());
    }
    Ok(())
}

fn show_status(svc: &AppServices) -> Result<()> {
    let session = svc.session();
    println!("Platform:  {}", session.platform_name());
    println!("State:     {}", session.device_state());
    println!(
        "Serial:    {}",
        session.get_device_sn().as_deref().unwrap_or("unavailable")
    );
    match session.try_get_printer_mileage() {
        Ok(mm) => println!("Mileage:   {mm:.1} mm"),
        Err(e) => println!("Mileage:   unavailable ({e})"),
    }

    if let Some(version) = session.get_version_info() {
        println!("Version:");
        for (key, value) in version {
            println!("  {key}: {value}");
        }
    }
    match session.get_printer() {
        Some(status) => {
            println!("Printer:");
            for (key, value) in status {
                println!("  {key}: {value}");
            }
        }
        None => println!("Printer:   status unavailable"),
    }
    Ok(())
}
