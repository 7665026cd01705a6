use clap::Parser;
use pptxvid::{
    error_exit_code, exit_code, report_exit_code, Cli, OutputFormatter, OutputMode, PptxVid,
    UserFriendlyError, VidError,
};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();
    setup_logging(&cli);

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let Some(package) = cli.package.as_deref() else {
        return exit_code::INVALID_INPUT;
    };

    let app = match PptxVid::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&cli, &e);
            return error_exit_code(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&app, package);
    }

    match app.extract(package).await {
        Ok(report) => {
            let formatter = app.output_formatter();
            formatter.print_extraction_report(&report);

            if cli.show_errors {
                formatter.print_error_details(&report);
            }

            if cli.open {
                if let Some(ref dir) = report.output_directory {
                    if let Err(e) = pptxvid::ui::open_in_file_browser(dir) {
                        formatter.warning(&e.user_message());
                    }
                }
            }

            report_exit_code(&report)
        }
        Err(e) => {
            app.handle_error(&e);
            error_exit_code(&e)
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "pptxvid.toml".to_string());

    match PptxVid::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  pptxvid <presentation.pptx> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!(
                "Failed to generate configuration file: {}",
                e.user_message()
            );
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            exit_code::GENERAL
        }
    }
}

fn handle_dry_run(app: &PptxVid, package: &Path) -> i32 {
    let formatter = app.output_formatter();
    formatter.info("DRY RUN MODE - No files will be extracted");

    match app.plan(package) {
        Ok(entries) => {
            formatter.print_dry_run(package, &entries);
            formatter.info(&format!(
                "Output would be created under {}",
                app.config().output.base_directory.display()
            ));
            exit_code::SUCCESS
        }
        Err(e) => {
            app.handle_error(&e);
            error_exit_code(&e)
        }
    }
}

fn print_startup_error(cli: &Cli, error: &VidError) {
    let formatter = OutputFormatter::new(OutputMode::from(cli.output_format), 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(cli: &Cli) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();
}
