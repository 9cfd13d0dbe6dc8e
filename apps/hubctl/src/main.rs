use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    anyhow::{Context, Result, bail},
    clap::{Parser, Subcommand},
    tracing::debug,
};

use {
    servicehub_client::{ApiClient, UploadFile},
    servicehub_common::{JobRequestDraft, ProfilePatch, RegisterForm, Role},
    servicehub_session::SessionStore,
    servicehub_vault::{FileVault, Vault},
};

/// Command-line client for the ServiceHub marketplace API.
///
/// Credentials persist under the config directory, so a login survives
/// across invocations until the token expires or `hubctl logout` runs.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Directory holding the persisted session (defaults to
    /// ~/.config/servicehub).
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// API base URL. Overrides SERVICEHUB_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session.
    Login {
        email: String,
        password: String,
    },
    /// Create an account and persist the session.
    Register {
        name: String,
        email: String,
        password: String,
        /// One of USER, MASTER, ADMIN.
        role: Role,
    },
    /// Clear the persisted session.
    Logout,
    /// Show the current session, if any.
    Whoami,
    /// Update the local profile (no network call).
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// List service categories.
    Categories,
    /// List notifications for the signed-in account.
    Notifications,
    /// Mark one notification as read.
    MarkRead { id: String },
    /// Show a professional's profile.
    Master { id: String },
    /// Work with job requests.
    #[command(subcommand)]
    Job(JobCommand),
    /// Upload portfolio images.
    Upload {
        portfolio_id: String,
        /// One or more image files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum JobCommand {
    /// Send a job request to a professional.
    Create {
        master_id: String,
        title: String,
        description: String,
        #[arg(long)]
        preferred_date: Option<String>,
        #[arg(long)]
        preferred_time: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// List job requests involving the signed-in account.
    List,
    Accept { id: String },
    Reject { id: String },
}

fn mime_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    let mime = match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(mime.to_string())
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let vault: Arc<dyn Vault> = Arc::new(match args.config_dir {
        Some(dir) => FileVault::new(dir),
        None => FileVault::default_location(),
    });
    let client = match args.api_url {
        Some(url) => ApiClient::new(url, Arc::clone(&vault)),
        None => ApiClient::from_env(Arc::clone(&vault)),
    };
    debug!(base_url = client.base_url(), "hubctl starting");

    let session = SessionStore::new(client.clone(), Arc::clone(&vault));
    session.initialize();

    match args.command {
        Command::Login { email, password } => match session.login(&email, &password).await {
            Ok(user) => print_json(&user)?,
            Err(err) => bail!("{err}"),
        },
        Command::Register {
            name,
            email,
            password,
            role,
        } => {
            let form = RegisterForm {
                name,
                email,
                confirm_password: password.clone(),
                password,
                role,
            };
            match session.register(&form).await {
                Ok(user) => print_json(&user)?,
                Err(err) => bail!("{err}"),
            }
        },
        Command::Logout => {
            session.logout();
            println!("signed out");
        },
        Command::Whoami => match session.user() {
            Some(user) => print_json(&user)?,
            None => println!("not signed in"),
        },
        Command::UpdateProfile { name, email, avatar } => {
            let patch = ProfilePatch { name, email, avatar };
            match session.update_user(&patch)? {
                Some(user) => print_json(&user)?,
                None => bail!("not signed in"),
            }
        },
        Command::Categories => print_json(&client.categories().await?)?,
        Command::Notifications => print_json(&client.notifications().await?)?,
        Command::MarkRead { id } => print_json(&client.mark_notification_read(&id).await?)?,
        Command::Master { id } => print_json(&client.user_full_info(&id).await?)?,
        Command::Job(job) => match job {
            JobCommand::Create {
                master_id,
                title,
                description,
                preferred_date,
                preferred_time,
                budget,
                address,
                phone,
            } => {
                let draft = JobRequestDraft {
                    master_id,
                    title,
                    description,
                    preferred_date,
                    preferred_time,
                    budget,
                    address,
                    phone,
                };
                print_json(&client.create_job_request(&draft).await?)?;
            },
            JobCommand::List => print_json(&client.my_job_requests().await?)?,
            JobCommand::Accept { id } => print_json(&client.accept_job_request(&id).await?)?,
            JobCommand::Reject { id } => print_json(&client.reject_job_request(&id).await?)?,
        },
        Command::Upload { portfolio_id, files } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in files {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());
                uploads.push(UploadFile {
                    file_name,
                    mime: mime_for(&path),
                    bytes,
                });
            }
            print_json(&client.upload_portfolio_images(&portfolio_id, uploads).await?)?;
        },
    }

    Ok(())
}
