use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use border_desk::app::services::polygon_text;
use border_desk::app::{
    AppError, AppState, ClientSettings, CredentialStore, HttpApi, Result, SessionContext,
};

/// BorderDesk - curate country boundaries and watch their usage
#[derive(Parser, Debug)]
#[command(name = "BorderDesk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Override the API base URL from settings
    #[arg(long)]
    api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Credentials {
    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,
}

#[derive(Args, Debug)]
struct PolygonSource {
    /// Polygons as a JSON array, e.g. '[[[-140, 60], [-120, 60], [-140, 60]]]'
    #[arg(long, conflicts_with = "polygons_file")]
    polygons: Option<String>,

    /// Read the polygon JSON array from a file
    #[arg(long)]
    polygons_file: Option<PathBuf>,
}

impl PolygonSource {
    fn text(&self) -> Result<Option<String>> {
        match (&self.polygons, &self.polygons_file) {
            (Some(text), _) => Ok(Some(text.clone())),
            (None, Some(path)) => Ok(Some(fs::read_to_string(path)?)),
            (None, None) => Ok(None),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and remember the credential
    Login(Credentials),

    /// Create an account and log in
    Register(Credentials),

    /// Forget the stored credential
    Logout,

    /// Show who the stored credential belongs to
    Whoami,

    /// List countries and usage statistics
    #[command(alias = "ls")]
    List {
        /// Skip the statistics table
        #[arg(long)]
        no_stats: bool,
    },

    /// Add a country
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        code: String,

        #[command(flatten)]
        source: PolygonSource,
    },

    /// Delete a country by code
    #[command(alias = "rm")]
    Remove { code: String },

    /// Replace the polygons of a country, or print them for editing
    Edit {
        code: String,

        #[command(flatten)]
        source: PolygonSource,
    },

    /// Show usage statistics only
    Stats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = ClientSettings::load();
    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
    }

    let api = Arc::new(HttpApi::new(settings));
    let session = SessionContext::restore(CredentialStore::new());
    let mut app = AppState::new(session, api.clone(), api.clone());

    match cli.command {
        Commands::Login(creds) => {
            app.login(&*api, &creds.email, &creds.password)?;
            println!("Logged in as {}", creds.email);
        }
        Commands::Register(creds) => {
            app.register(&*api, &creds.email, &creds.password)?;
            println!("Registered and logged in as {}", creds.email);
        }
        Commands::Logout => {
            app.logout()?;
            println!("Logged out");
        }
        Commands::Whoami => match app.session.user() {
            Some(user) => println!(
                "{} ({})",
                user.email.as_deref().unwrap_or("unknown email"),
                user.id.as_deref().unwrap_or("unknown id")
            ),
            None if app.session.is_authenticated() => println!("Logged in"),
            None => return Err(AppError::NotAuthenticated),
        },
        Commands::List { no_stats } => {
            app.spawn_load()?;
            if !no_stats {
                app.spawn_stats();
            }
            first_error(app.wait_all())?;
            print_countries(&app);
            if !no_stats {
                print_stats(&app);
            }
        }
        Commands::Add { name, code, source } => {
            let text = source
                .text()?
                .ok_or_else(|| AppError::Validation("--polygons or --polygons-file is required".to_string()))?;
            let polygons = polygon_text::parse(&text)?;
            app.spawn_add(&name, &code, polygons)?;
            first_error(app.wait_all())?;
            println!("Added {} ({})", name, code);
        }
        Commands::Remove { code } => {
            app.spawn_remove(&code)?;
            first_error(app.wait_all())?;
            println!("Removed {}", code);
        }
        Commands::Edit { code, source } => edit(&mut app, &code, source.text()?)?,
        Commands::Stats => {
            if !app.session.is_authenticated() {
                return Err(AppError::NotAuthenticated);
            }
            app.spawn_stats();
            app.wait_all();
            print_stats(&app);
        }
    }
    Ok(())
}

/// Without new text, print the edit buffer so it can be piped back in.
fn edit(app: &mut AppState, code: &str, text: Option<String>) -> Result<()> {
    app.spawn_load()?;
    first_error(app.wait_all())?;

    let record = app
        .registry
        .find(code)
        .cloned()
        .ok_or_else(|| AppError::Remote(format!("No country with code {}", code)))?;
    app.edit.begin(&record)?;

    let Some(text) = text else {
        println!("{}", app.edit.buffer().unwrap_or_default());
        app.edit.cancel();
        return Ok(());
    };

    app.edit.set_buffer(text)?;
    app.spawn_commit()?;
    first_error(app.wait_all())?;
    let polygons = app
        .registry
        .find(code)
        .map(|r| r.polygons.clone())
        .unwrap_or_default();
    println!("Updated {}: {} polygon(s)", code, polygons.len());
    Ok(())
}

fn first_error(errors: Vec<AppError>) -> Result<()> {
    match errors.into_iter().next() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn print_countries(app: &AppState) {
    println!("{:>3}  {:<24} {:<6} POLYGONS", "#", "NAME", "CODE");
    for (i, country) in app.registry.records().iter().enumerate() {
        let lines = polygon_text::describe(&country.polygons);
        let first = lines.first().map(String::as_str).unwrap_or("-");
        println!("{:>3}  {:<24} {:<6} {}", i + 1, country.name, country.code, first);
        for line in lines.iter().skip(1) {
            println!("{:>3}  {:<24} {:<6} {}", "", "", "", line);
        }
    }
}

fn print_stats(app: &AppState) {
    println!();
    println!("{:<8} {:>14} {:>8} {:>8}", "CODE", "TOTAL", "INSIDE", "OUTSIDE");
    for stat in app.stats.entries() {
        println!(
            "{:<8} {:>14} {:>8} {:>8}",
            stat.code, stat.total_requests, stat.true_responses, stat.false_responses
        );
    }
}
