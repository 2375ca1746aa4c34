// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use rowdesk_tui::TuiOptions;
use runtime::Backend;
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
            "load config {}; run `rowdesk --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let mut backend = Backend::from_config(&config, options.demo).with_context(|| {
        format!(
            "invalid config in {}; fix the [api] section",
            options.config_path.display()
        )
    })?;

    if options.check_only {
        println!("{}", backend.check()?);
        return Ok(());
    }

    let log_path = logging::default_log_path()?;
    logging::init(&log_path)?;
    tracing::info!(backend = %backend.describe(), "starting rowdesk");

    let tui_options = TuiOptions {
        initial_table: options
            .table
            .or_else(|| config.default_table().map(str::to_owned)),
        search_debounce: config.search_debounce()?,
    };
    rowdesk_tui::run_app(&mut backend, &tui_options)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    show_help: bool,
    table: Option<String>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        show_help: false,
        table: None,
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
            "--table" => {
                let value = iter
                    .next()
                    .filter(|value| !value.as_ref().trim().is_empty())
                    .ok_or_else(|| anyhow!("--table requires a table name"))?;
                options.table = Some(value.as_ref().trim().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
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
    println!("rowdesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --table <name>           Open this table first");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Browse seeded demo data instead of the API");
    println!("  --check                  Validate config and reach the backend, then exit");
    println!("  --help                   Show this help");
    println!();
    println!("Logs go to the local data dir; set {} to change the filter.", logging::LOG_ENV);
}
