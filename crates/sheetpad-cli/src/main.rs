// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;

use anyhow::{Context, Result, anyhow};
use config::Config;
use log::info;
use sheetpad_client::Client;
use sheetpad_tui::LaunchOptions;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `sheetpad --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let log_file = config.log_file()?;
    logging::init(config.log_level()?, &log_file)?;

    let base_url = config.base_url();
    let mut client = Client::new(&base_url, config.timeout()?).with_context(|| {
        format!(
            "invalid [server] config in {}; fix base_url/timeout or set {}",
            options.config_path.display(),
            config::BASE_URL_ENV
        )
    })?;
    info!(
        "sheetpad starting against {} (timeout {:?})",
        client.base_url(),
        client.timeout()
    );

    if options.check_only {
        client
            .ping()
            .with_context(|| format!("check sheets service at {}", client.base_url()))?;
        println!("ok: {} is reachable", client.base_url());
        return Ok(());
    }

    let launch = LaunchOptions {
        open_sheet: options.sheet,
        default_rows: config.default_rows(),
        default_cols: config.default_cols(),
        service_label: client.base_url().to_owned(),
    };
    let result = sheetpad_tui::run_app(&mut client, launch);
    info!("sheetpad exiting");
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    sheet: Option<String>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        sheet: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--sheet" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--sheet requires a sheet name"))?;
                let name = value.as_ref().trim();
                if name.is_empty() {
                    return Err(anyhow!("--sheet requires a non-empty sheet name"));
                }
                options.sheet = Some(name.to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("sheetpad");
    println!("  --config <path>          Use a specific config path");
    println!("  --sheet <name>           Open a sheet directly instead of the sheet list");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and reach the sheets service");
    println!("  --help                   Show this help");
}
