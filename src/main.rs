use clap::Parser;
use clean_my_web::cli::commands::{
    cmd_apply, cmd_describe, cmd_reset, cmd_select, cmd_set_disabled, cmd_show, cmd_sites,
};
use clean_my_web::cli::config::{Cli, Commands, Settings, load_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref());
    let settings = Settings::resolve(&cli, &config);

    match cli.command {
        Commands::Apply {
            host,
            html,
            url,
            output,
        } => {
            cmd_apply(
                &settings,
                host.as_deref(),
                html.as_deref(),
                url.as_deref(),
                output.as_deref(),
            )?;
        }
        Commands::Describe {
            host,
            html,
            xpath,
            selector,
            save,
        } => {
            cmd_describe(
                &settings,
                &host,
                &html,
                xpath.as_deref(),
                selector.as_deref(),
                save,
            )?;
        }
        Commands::Select { script, html } => {
            let all_passed = cmd_select(&settings, &script, html.as_deref(), cli.verbose)?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Sites => cmd_sites(&settings)?,
        Commands::Show { host, key } => {
            if !cmd_show(&settings, &host, &key)? {
                std::process::exit(1);
            }
        }
        Commands::Reset { host, all } => cmd_reset(&settings, host.as_deref(), all)?,
        Commands::Disable { host } => cmd_set_disabled(&settings, &host, true)?,
        Commands::Enable { host } => cmd_set_disabled(&settings, &host, false)?,
    }

    Ok(())
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}
