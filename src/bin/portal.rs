use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};

use complaint_portal::api::{http_client, PortalClient};
use complaint_portal::config::Config;
use complaint_portal::form::ComplaintForm;
use complaint_portal::geo::{Coordinates, LocationResolver};
use complaint_portal::models::{ImageAttachment, DEPARTMENTS};
use complaint_portal::session::SessionStore;

#[derive(Parser, Debug)]
#[command(
    name = "complaint-portal",
    about = "Command line client for the citizen complaint portal"
)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session token
    Login {
        /// Account email; prompted for when omitted
        #[arg(long, env = "PORTAL_EMAIL")]
        email: Option<String>,

        /// Account password; prompted for when omitted
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Drop the stored session
    Logout,
    /// Show who is currently signed in
    Whoami,
    /// List the departments a complaint can be routed to
    Departments,
    /// Register a complaint
    Submit(SubmitArgs),
}

#[derive(clap::Args, Debug)]
struct SubmitArgs {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Latitude, e.g. 12.9716
    #[arg(long, env = "PORTAL_LATITUDE", allow_hyphen_values = true)]
    latitude: Option<String>,

    /// Longitude, e.g. 77.5946
    #[arg(long, env = "PORTAL_LONGITUDE", allow_hyphen_values = true)]
    longitude: Option<String>,

    #[arg(long)]
    locality: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    state: Option<String>,

    /// Department name, see `departments` for the list
    #[arg(long)]
    department: Option<String>,

    /// Path of an image to attach
    #[arg(long)]
    image: Option<PathBuf>,

    /// Fill coordinates and address from the current location
    #[arg(long)]
    locate: bool,

    /// Walk through the form interactively
    #[arg(short, long)]
    interactive: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env before clap resolves env-backed arguments.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    stderrlog::new()
        .verbosity(level)
        .timestamp(stderrlog::Timestamp::Millisecond)
        .init()
        .unwrap();

    let config = Config::from_env()?;
    config.validate()?;
    let store = SessionStore::new(config.session_file.clone());

    match cli.command {
        Command::Login { email, password } => login(&config, &store, email, password).await,
        Command::Logout => logout(&store),
        Command::Whoami => whoami(&store),
        Command::Departments => {
            for (i, department) in DEPARTMENTS.iter().enumerate() {
                println!("{:2}. {}", i + 1, department);
            }
            Ok(())
        }
        Command::Submit(args) => submit(&config, &store, args).await,
    }
}

async fn login(
    config: &Config,
    store: &SessionStore,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let client = PortalClient::new(http_client(config)?, config.api_base_url.clone());
    let session = client.login(&email, &password).await?;
    store.save(&session)?;
    log::info!("session stored at {}", store.path().display());

    println!("Login successful!");
    if let Some(name) = session.user["name"].as_str() {
        println!("Signed in as {}.", name);
    }
    Ok(())
}

fn logout(store: &SessionStore) -> Result<()> {
    if store.clear()? {
        println!("Signed out.");
    } else {
        println!("No active session.");
    }
    Ok(())
}

fn whoami(store: &SessionStore) -> Result<()> {
    match store.load()? {
        Some(session) => {
            let user = &session.user;
            match (user["name"].as_str(), user["email"].as_str()) {
                (Some(name), Some(email)) => println!("{} <{}>", name, email),
                (Some(name), None) => println!("{}", name),
                (None, Some(email)) => println!("{}", email),
                (None, None) => println!("Signed in (no profile details stored)."),
            }
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

async fn submit(config: &Config, store: &SessionStore, args: SubmitArgs) -> Result<()> {
    let http = http_client(config)?;

    // A broken session file should not block an anonymous submission.
    let session = match store.load() {
        Ok(session) => session,
        Err(err) => {
            log::warn!("ignoring unreadable session file: {}", err);
            None
        }
    };
    let mut client = PortalClient::new(http.clone(), config.api_base_url.clone());
    if let Some(session) = &session {
        client = client.with_token(session.token.clone());
    }

    let mut resolver = LocationResolver::new(
        http,
        config.reverse_geocode_url.clone(),
        config.position_api_url.clone(),
    );
    if let (Some(lat), Some(lon)) = (&args.latitude, &args.longitude) {
        if let (Ok(latitude), Ok(longitude)) = (lat.parse(), lon.parse()) {
            resolver = resolver.with_fixed(Coordinates {
                latitude,
                longitude,
            });
        }
    }

    if let Some(department) = &args.department {
        if !DEPARTMENTS.contains(&department.as_str()) {
            log::warn!("department {:?} is not in the standard list", department);
        }
    }

    let mut form = ComplaintForm::new();
    let flag_fields: [(&str, &Option<String>); 8] = [
        ("title", &args.title),
        ("description", &args.description),
        ("latitude", &args.latitude),
        ("longitude", &args.longitude),
        ("locality", &args.locality),
        ("city", &args.city),
        ("state", &args.state),
        ("department", &args.department),
    ];
    for (name, value) in flag_fields {
        if let Some(value) = value {
            form.store_mut().set_field(name, value.clone())?;
        }
    }
    if let Some(path) = &args.image {
        let attachment = ImageAttachment::from_path(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        println!("Attached {}", attachment.preview());
        form.store_mut().set_image(Some(attachment));
    }

    if args.locate {
        form.capture_location(&resolver).await;
        form.print_status();
    }

    if args.interactive {
        return form.run_interactive(&resolver, &client).await;
    }

    match form.submit(&client).await {
        Some(Ok(result)) => {
            if result.message.is_empty() {
                println!("Complaint registered successfully!");
            } else {
                println!("{}", result.message);
            }
            Ok(())
        }
        Some(Err(err)) => Err(err.into()),
        None => anyhow::bail!("a submission is already in flight"),
    }
}
