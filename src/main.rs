use anyhow::Result;
use searchedit::cli::{self, Args, Mode};
use searchedit::config::{self, Config};
use searchedit::display::Display;
use searchedit::logger;
use searchedit::matcher::Matcher;
use searchedit::session::{Session, SessionOutcome};
use std::io;
use std::path::Path;

fn main() -> Result<()> {
    let args = cli::parse_args();

    let app_dir = config::app_dir()?;
    let config_path = app_dir.join("config.toml");
    let mut config = config::load_config_from(&config_path)?;
    config::validate_config(&config)?;
    apply_overrides(&mut config, &args);

    let log_handle = logger::init_debug_logging(args.debug || config.logging.debug, &app_dir)?;
    if let Some(handle) = &log_handle {
        tracing::info!(log = %handle.path.display(), "debug logging enabled");
    }

    if let Mode::Config { show } = args.mode {
        return show_config(&config, &config_path, &app_dir, show);
    }

    let paths = config.resolve_paths(&app_dir);
    tracing::debug!(?paths, "resolved paths");

    let stdin = io::stdin();
    let mut session = Session::new(
        stdin.lock(),
        io::stdout(),
        paths,
        Matcher::new(config.search.extension.clone()),
        Display::auto(),
    );

    let outcome = match args.mode {
        Mode::Edit => session.run_edit()?,
        Mode::Rollback => session.run_rollback()?,
        _ => session.run_main_menu()?,
    };

    if let SessionOutcome::InvalidDirectory(dir) = outcome {
        tracing::info!(dir = %dir, "invalid directory selected");
        drop(log_handle);
        std::process::exit(1);
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(dir) = &args.data_dir {
        config.paths.data_dir = Some(dir.clone());
    }
    if let Some(dir) = &args.backup_dir {
        config.paths.backup_dir = Some(dir.clone());
    }
}

fn show_config(config: &Config, config_path: &Path, app_dir: &Path, show: bool) -> Result<()> {
    if !show {
        println!("Configuration file: {}", config_path.display());
        println!("✅ Configuration is valid");
        return Ok(());
    }

    println!("# {}\n", config_path.display());
    println!("{}", toml::to_string_pretty(config)?);

    let paths = config.resolve_paths(app_dir);
    println!("Resolved paths:");
    println!("  data_dir:        {}", paths.data_dir.display());
    println!("  backup_dir:      {}", paths.backup_dir.display());
    println!("  logs_dir:        {}", paths.logs_dir.display());
    println!("  saved_dirs_file: {}", paths.saved_dirs_file.display());

    Ok(())
}
