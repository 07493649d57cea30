//! Portal command line - every admin and resident operation over the local
//! data directory.

mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use common::{AppError, AppResult, PortalConfig};
use domain::{wifi, PaymentStatus, UserRole};
use portal_lib::{
    run_polling, AdminConsole, HistoryForm, NewUserForm, Notifier, ProfileForm,
    ResidentDashboard, ServiceForm, TracingNotifier,
};
use session_guard_lib::{Redirect, SessionGuard};

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Residential services customer portal")]
struct Cli {
    /// Directory holding the database and session files
    #[arg(long, global = true, env = "PORTAL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, env = "PORTAL_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database if it does not exist yet
    Init,
    /// Sign in
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show who is signed in
    Whoami,
    /// Create a resident account and sign in
    Register {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Admin console (requires an admin session)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Resident dashboard (requires a session)
    Resident {
        #[command(subcommand)]
        action: ResidentAction,
    },
    /// Print a random WiFi password
    WifiPassword,
}

#[derive(Subcommand)]
enum AdminAction {
    /// List residents with status and unread messages
    Residents,
    /// Show a resident's chat and mark it read
    Chat { user_id: String },
    /// Send a message to a resident
    Send { user_id: String, text: String },
    /// Show the client manager for a resident
    Show { user_id: String },
    /// Change username, alias and password
    Profile {
        user_id: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        alias: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Change billing status, due date, speed and WiFi
    Service(ServiceArgs),
    /// Add a billing-history row, or edit one with --id
    History(HistoryArgs),
    /// Delete a billing-history row
    HistoryDelete { user_id: String, item_id: Uuid },
    /// Create an account
    CreateUser {
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "resident")]
        role: UserRole,
    },
    /// Delete an account and its profile
    DeleteUser { user_id: String },
    /// Refresh the resident table until interrupted
    Watch {
        /// Seconds between refreshes
        #[arg(long, env = "PORTAL_ADMIN_POLL_SECS")]
        interval: Option<u64>,
    },
}

#[derive(Args)]
struct ServiceArgs {
    user_id: String,
    #[arg(long)]
    status: Option<PaymentStatus>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    speed: Option<u32>,
    #[arg(long)]
    ssid: Option<String>,
    #[arg(long, conflicts_with = "generate_wifi_pass")]
    wifi_pass: Option<String>,
    /// Replace the WiFi password with a random one
    #[arg(long)]
    generate_wifi_pass: bool,
}

#[derive(Args)]
struct HistoryArgs {
    user_id: String,
    /// Row to edit; omit to add a new one
    #[arg(long)]
    id: Option<Uuid>,
    #[arg(long, default_value = "")]
    period: String,
    /// Defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, default_value = domain::DEFAULT_BILLING_AMOUNT)]
    amount: String,
    #[arg(long, default_value = "paid")]
    status: PaymentStatus,
}

#[derive(Subcommand)]
enum ResidentAction {
    /// Show the dashboard
    Show,
    /// Send a message to the administration
    Send { text: String },
    /// Set the alias; an empty alias clears it
    Alias { alias: String },
    /// Show the billing history
    History,
    /// Refresh the dashboard until interrupted
    Watch {
        /// Seconds between refreshes
        #[arg(long, env = "PORTAL_RESIDENT_POLL_SECS")]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = PortalConfig::from_env();
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }

    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli.command, config).await {
        if e.is_client_error() {
            warn!(code = e.code(), error = %e, "command rejected");
        } else {
            error!(code = e.code(), error = %e, "command failed");
        }
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, config: PortalConfig) -> AppResult<()> {
    let (records, storage) = record_store_lib::open_file_store(&config.data_dir)?;
    let guard = SessionGuard::with_storage(records, storage);
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

    match command {
        Commands::Init => {
            let users = guard.records().list_users()?;
            println!(
                "{} usuarios en {}",
                users.len(),
                config.data_dir.display()
            );
        }
        Commands::Login { username, password } => {
            let user = guard.login(&username, &password)?;
            println!("Bienvenido, {}", user.display_name());
            println!("{}", landing_page(user.role));
        }
        Commands::Logout => {
            guard.logout()?;
            println!("{}", Redirect::ToLogin.target());
        }
        Commands::Whoami => match guard.current_session()? {
            Some(session) => println!(
                "{} ({}, {}) desde {}",
                session.user.display_name(),
                session.user.username,
                session.user.role,
                session.signed_in_at
            ),
            None => println!("Sin sesión"),
        },
        Commands::Register { username, password } => {
            let user = guard.register(username.trim(), password.trim())?;
            println!("Cuenta creada: {}", user.username);
            println!("{}", landing_page(user.role));
        }
        Commands::Admin { action } => {
            let console = match AdminConsole::open(&guard, notifier, &config.qr_service_url).await? {
                Ok(console) => console,
                Err(redirect) => return Err(redirected(redirect)),
            };
            run_admin(&console, action, &config).await?;
        }
        Commands::Resident { action } => {
            let dashboard =
                match ResidentDashboard::open(&guard, notifier, &config.qr_service_url).await? {
                    Ok(dashboard) => dashboard,
                    Err(redirect) => return Err(redirected(redirect)),
                };
            run_resident(&dashboard, action, &config).await?;
        }
        Commands::WifiPassword => println!("{}", wifi::generate_password()),
    }

    Ok(())
}

async fn run_admin(console: &AdminConsole, action: AdminAction, config: &PortalConfig) -> AppResult<()> {
    match action {
        AdminAction::Residents => render::residents(&console.residents()?),
        AdminAction::Chat { user_id } => render::chat(&console.open_chat(&user_id)?),
        AdminAction::Send { user_id, text } => {
            if console.send_message(&user_id, &text).await?.is_none() {
                println!("Mensaje vacío o residente sin perfil; nada enviado");
            }
        }
        AdminAction::Show { user_id } => render::manager(&console.open_manager(&user_id)?),
        AdminAction::Profile {
            user_id,
            username,
            alias,
            password,
        } => {
            let current = console.open_manager(&user_id)?;
            let form = ProfileForm::new(
                username.as_deref().unwrap_or(&current.username),
                alias.as_deref().unwrap_or(&current.alias),
                password.as_deref(),
            );
            render::manager(&console.save_profile(&user_id, form)?);
            println!("Perfil actualizado");
        }
        AdminAction::Service(args) => {
            let current = console.open_manager(&args.user_id)?;
            let wifi_password = if args.generate_wifi_pass {
                wifi::generate_password()
            } else {
                args.wifi_pass.unwrap_or(current.wifi_password)
            };
            let form = ServiceForm {
                payment_status: args.status.unwrap_or(current.badge.status),
                next_payment_date: args.date,
                internet_speed: args.speed.unwrap_or(current.internet_speed),
                wifi_ssid: args.ssid.unwrap_or(current.wifi_ssid),
                wifi_password,
            };
            render::manager(&console.save_service(&args.user_id, form)?);
            println!("Servicio y WiFi actualizados");
        }
        AdminAction::History(args) => {
            let form = HistoryForm {
                id: args.id,
                period: args.period,
                date: args
                    .date
                    .unwrap_or_else(|| chrono::Local::now().date_naive()),
                amount: args.amount,
                status: args.status,
            };
            render::history(&console.save_history_item(&args.user_id, form)?);
        }
        AdminAction::HistoryDelete { user_id, item_id } => {
            render::history(&console.delete_history_item(&user_id, item_id)?);
        }
        AdminAction::CreateUser {
            username,
            password,
            role,
        } => {
            let user = console.create_user(NewUserForm::new(&username, &password, role))?;
            println!("Usuario creado exitosamente: {} ({})", user.username, user.id);
        }
        AdminAction::DeleteUser { user_id } => {
            console.delete_user(&user_id)?;
            println!("Usuario eliminado");
        }
        AdminAction::Watch { interval } => {
            let period = interval
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(config.admin_poll_interval);
            info!(period_secs = period.as_secs(), "watching residents");

            run_polling(period, shutdown_signal(), move || async move {
                render::residents(&console.tick().await?);
                println!();
                Ok::<(), AppError>(())
            })
            .await;
        }
    }
    Ok(())
}

async fn run_resident(
    dashboard: &ResidentDashboard,
    action: ResidentAction,
    config: &PortalConfig,
) -> AppResult<()> {
    match action {
        ResidentAction::Show => render::dashboard(&dashboard.view()?),
        ResidentAction::Send { text } => {
            if dashboard.send_message(&text).await?.is_none() {
                println!("Mensaje vacío; nada enviado");
            }
        }
        ResidentAction::Alias { alias } => render::dashboard(&dashboard.set_alias(&alias)?),
        ResidentAction::History => render::history(&dashboard.history()?),
        ResidentAction::Watch { interval } => {
            let period = interval
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(config.resident_poll_interval);
            info!(period_secs = period.as_secs(), "watching dashboard");

            run_polling(period, shutdown_signal(), move || async move {
                render::dashboard(&dashboard.tick().await?);
                println!();
                Ok::<(), AppError>(())
            })
            .await;
        }
    }
    Ok(())
}

fn landing_page(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "Consola: portal admin residents",
        UserRole::Resident => "Panel: portal resident show",
    }
}

fn redirected(redirect: Redirect) -> AppError {
    eprintln!("{}", redirect);
    redirect.into()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
