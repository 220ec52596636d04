use clap::Parser;

use shell_qr::cli::{self, Args, Command, Settings};

fn main() {
    // Load .env file, don't override existing env vars.
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // If --config is specified, require the file to exist.
    // Otherwise, fall back to defaults if the default config is missing or broken
    let config = match cli::load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let settings = Settings::resolve(&args, &config);

    let result = match args.command.clone().unwrap_or(Command::Watch) {
        Command::Watch => cli::run_watch(settings),
        Command::Extract => cli::run_extract(settings),
        Command::Config { action } => {
            cli::handle_config_action(action, &settings, args.config.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
