use std::net::SocketAddr;
use std::process;

use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use futures_util::StreamExt;
use terminal_size::{terminal_size, Width};
use tokio::io::AsyncWriteExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use ovpanel::api;
use ovpanel::config::{self, DEFAULT_HOST, DEFAULT_MAX_DEVICES, DEFAULT_PORT};
use ovpanel::models::{AppState, OperatorRecord, Tab};
use ovpanel::routes::build_router;
use ovpanel::services::{
    build_views, filter_for_tab, generate_password_hash, load_operators_from_file,
    persist_operators_file, validate_approval,
};

async fn build_state_from_env(env_file: Option<&str>) -> AppState {
    config::load_env_file(env_file);
    let operators = load_operators_from_file().await;

    let client = reqwest::Client::builder()
        .user_agent(format!("ovpanel/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client");

    AppState {
        operators,
        sessions: std::sync::Arc::new(std::sync::Mutex::new(std::collections::HashMap::new())),
        flash_store: std::sync::Arc::new(std::sync::Mutex::new(std::collections::HashMap::new())),
        api_base_url: config::get_api_base_url(),
        api_token: config::get_api_token(),
        public_base_url: config::get_public_base_url(),
        client,
        custom_css: None,
    }
}

async fn start_server(mut state: AppState, host: &str, port: u16, stylesheet: Option<String>) {
    if let Some(path) = stylesheet {
        match std::fs::read_to_string(&path) {
            Ok(css) => {
                state.custom_css = Some(css);
                tracing::info!("Loaded custom stylesheet from {}", path);
            }
            Err(e) => {
                tracing::error!(%e, "Failed to read custom stylesheet");
                eprintln!(
                    "{} {}: {}",
                    yansi::Paint::red("Failed to read custom stylesheet at"),
                    path,
                    e
                );
                process::exit(1);
            }
        }
    }

    if state.api_base_url.trim().is_empty() {
        eprintln!(
            "{}",
            yansi::Paint::yellow("Warning: API_BASE_URL is not configured; backend calls will fail")
        );
    }

    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(%e, "Invalid host/port format");
            eprintln!("{}: {}", yansi::Paint::red("Invalid host/port format"), e);
            process::exit(1);
        }
    };
    let app = build_router(state);
    tracing::info!(%addr, "Starting ovpanel server");
    println!(
        "{} {}",
        yansi::Paint::new("Panel running on").green(),
        yansi::Paint::new(format!("http://{}", addr)).cyan()
    );
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(%e, "Server encountered an error while running");
                eprintln!("{}: {}", yansi::Paint::new("Server error").red(), e);
                process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(%e, "Failed to bind to address; is the port already in use?");
            eprintln!(
                "{}: {}",
                yansi::Paint::new(format!("Failed to bind to {}", addr)).red(),
                e
            );
            process::exit(1);
        }
    }
}

fn confirm_on_stdin(prompt: &str) -> bool {
    use std::io::Write;
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush().ok();
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

fn status_paint(status: &str) -> String {
    match status {
        "pending" => yansi::Paint::new(status).yellow().to_string(),
        "approved" => yansi::Paint::new(status).green().to_string(),
        "rejected" | "suspended" => yansi::Paint::new(status).red().to_string(),
        other => other.to_string(),
    }
}

#[derive(Parser)]
#[command(
    name = "ovpanel",
    author,
    version,
    about = "VPN account administration panel",
    long_about = r#"ovpanel — administer VPN accounts through the backend's REST API.

Runs the operator web panel and exposes the same account actions on the
command line: list accounts by review status, approve pending accounts,
fetch OpenVPN config files and delete accounts. Use `--env-file` or
environment variables (API_BASE_URL, API_TOKEN) to point it at the
backend.

Examples:
  1) Run the panel:
      ovpanel serve --host 127.0.0.1 --port 8080
  2) Review the queue:
      ovpanel accounts list --tab pending
  3) Approve an account:
      ovpanel accounts approve 42 --password 'longenough' --max-devices 2
"#,
    after_help = "Use `ovpanel <subcommand> --help` for subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Disable request/response logging
    #[arg(long, global = true)]
    silent: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web panel
    Serve {
        /// Host to bind to
        #[arg(long, default_value_t = String::from(DEFAULT_HOST))]
        host: String,
        /// Port to bind to
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
        /// Path to a custom stylesheet to serve instead of the default
        #[arg(long)]
        stylesheet: Option<String>,
    },
    /// Validate configuration and backend connectivity
    #[command(
        about = "Validate configuration and ensure backend connectivity.",
        long_about = "Check the environment variables the panel needs, then attempt to fetch the account list from the backend."
    )]
    CheckConfig { env_file: Option<String> },
    /// Manage panel operators (operators.json)
    Operators {
        #[command(subcommand)]
        sub: OperatorCommands,
    },
    /// Manage VPN accounts via the backend API
    #[command(
        about = "Manage VPN accounts (list, approve, download, delete)",
        long_about = "These commands perform the same actions the web panel performs; they call the backend REST API with the current configuration. Be careful with approve and delete; they mutate backend state, and the backend owns all status transitions."
    )]
    Accounts {
        #[command(subcommand)]
        sub: AccountCommands,
    },
}

#[derive(Subcommand)]
enum OperatorCommands {
    #[command(about = "List panel operators")]
    List,
    #[command(
        about = "Add a panel operator",
        long_about = "Add an operator who may sign in to the panel. The password is hashed before it is saved to operators.json."
    )]
    Add { username: String, password: String },
    #[command(about = "Reset an operator's password")]
    ResetPassword { username: String, password: String },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// List accounts, optionally filtered by tab
    #[command(about = "List VPN accounts", long_about = "List accounts as the backend reports them. `--tab` applies the same filter the web panel's tabs apply: pending, approved or all.")]
    List {
        /// Tab filter: pending, approved or all
        #[arg(long, default_value = "all")]
        tab: String,
    },
    /// Approve a pending account
    #[command(about = "Approve a pending account", long_about = "Provision the account on the backend. The OpenVPN login defaults to the account's username when `--ovpn-username` is omitted.")]
    Approve {
        account_id: i64,
        /// OpenVPN login to provision (defaults to the account's username)
        #[arg(long)]
        ovpn_username: Option<String>,
        /// OpenVPN password (minimum 8 characters)
        #[arg(long)]
        password: String,
        /// Maximum simultaneous devices
        #[arg(long, default_value_t = DEFAULT_MAX_DEVICES)]
        max_devices: u32,
    },
    /// Download an approved account's OpenVPN config file
    Download {
        username: String,
        /// Output path (defaults to the backend-provided filename)
        #[arg(long)]
        output: Option<String>,
    },
    /// Delete an account (irreversible)
    Delete {
        account_id: i64,
        /// Skip the confirmation prompt
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    if cli.silent {
        api::client::set_silent(true);
    }

    // No subcommand starts the web panel with defaults.
    if cli.command.is_none() {
        let state = build_state_from_env(None).await;
        start_server(state, DEFAULT_HOST, DEFAULT_PORT, None).await;
        return;
    }
    match cli.command.unwrap() {
        Commands::Serve {
            host,
            port,
            env_file,
            stylesheet,
        } => {
            let state = build_state_from_env(env_file.as_deref()).await;
            start_server(state, &host, port, stylesheet).await;
        }
        Commands::CheckConfig { env_file } => {
            let state = build_state_from_env(env_file.as_deref()).await;
            if state.api_base_url.trim().is_empty() {
                eprintln!("{}", yansi::Paint::new("API_BASE_URL is not configured").red());
                process::exit(1);
            }
            match api::load_accounts(&state.client, &state.api_base_url, &state.api_token).await {
                Ok(accounts) => {
                    println!(
                        "{}",
                        yansi::Paint::new(format!(
                            "Configuration looks valid ({} accounts returned)",
                            accounts.len()
                        ))
                        .green()
                    );
                }
                Err(e) => {
                    eprintln!(
                        "{}: {}",
                        yansi::Paint::new("Configuration appears invalid").red(),
                        e
                    );
                    process::exit(1);
                }
            }
        }
        Commands::Operators { sub } => {
            let state = build_state_from_env(None).await;
            match sub {
                OperatorCommands::List => {
                    let operators = state.operators.lock().unwrap();
                    let mut names: Vec<&String> = operators.keys().collect();
                    names.sort();
                    println!("{}", yansi::Paint::new("username").bold().underline());
                    for name in names {
                        println!("{}", name);
                    }
                }
                OperatorCommands::Add { username, password } => {
                    let uname = username.trim().to_lowercase();
                    {
                        let mut operators = state.operators.lock().unwrap();
                        if operators.contains_key(&uname) {
                            eprintln!(
                                "{} '{}' {}",
                                yansi::Paint::new("Operator").red(),
                                uname,
                                yansi::Paint::new("already exists").red()
                            );
                            process::exit(1);
                        }
                        let hash = generate_password_hash(&password);
                        operators.insert(uname.clone(), OperatorRecord { password: hash });
                    }
                    if let Err(e) = persist_operators_file(&state.operators).await {
                        eprintln!("{}: {}", yansi::Paint::new("Failed to persist operators file").red(), e);
                        process::exit(1);
                    }
                    println!(
                        "{} '{}' {}",
                        yansi::Paint::new("Operator").green(),
                        uname,
                        yansi::Paint::new("added").green()
                    );
                }
                OperatorCommands::ResetPassword { username, password } => {
                    let uname = username.trim().to_lowercase();
                    {
                        let mut operators = state.operators.lock().unwrap();
                        if let Some(rec) = operators.get_mut(&uname) {
                            rec.password = generate_password_hash(&password);
                        } else {
                            eprintln!(
                                "{} '{}' {}",
                                yansi::Paint::new("Operator").red(),
                                uname,
                                yansi::Paint::new("not found").red()
                            );
                            process::exit(1);
                        }
                    }
                    if let Err(e) = persist_operators_file(&state.operators).await {
                        eprintln!("{}: {}", yansi::Paint::new("Failed to persist operators file").red(), e);
                        process::exit(1);
                    }
                    println!(
                        "{} '{}' {}",
                        yansi::Paint::new("Password for").green(),
                        uname,
                        yansi::Paint::new("updated").green()
                    );
                }
            }
        }
        Commands::Accounts { sub } => {
            let state = build_state_from_env(None).await;
            match sub {
                AccountCommands::List { tab } => {
                    let Some(tab) = Tab::from_slug(&tab) else {
                        eprintln!(
                            "{}: expected pending, approved or all",
                            yansi::Paint::new("Unknown tab").red()
                        );
                        process::exit(1);
                    };
                    let records =
                        match api::load_accounts(&state.client, &state.api_base_url, &state.api_token).await {
                            Ok(records) => records,
                            Err(e) => {
                                eprintln!("{}: {}", yansi::Paint::new("Failed to load accounts").red(), e);
                                process::exit(1);
                            }
                        };
                    let views = build_views(&filter_for_tab(tab, records));

                    let mut table = Table::new();
                    table.load_preset(presets::UTF8_FULL);
                    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
                    table.set_content_arrangement(ContentArrangement::Dynamic);
                    if let Some((Width(w), _)) = terminal_size() {
                        table.set_width(w.saturating_sub(4));
                    }
                    table.set_header(vec!["ID", "Username", "Email", "Status", "Created", "OpenVPN login", "Devices"]);
                    for account in &views {
                        table.add_row(vec![
                            account.id.to_string(),
                            account.username.clone(),
                            account.email.clone(),
                            status_paint(&account.status_class),
                            account.created_display.clone(),
                            account.ovpn_username.clone().unwrap_or_default(),
                            account.max_devices_display.clone().unwrap_or_default(),
                        ]);
                    }
                    println!("\n{table}");
                    if views.is_empty() {
                        println!("{}", yansi::Paint::new("No accounts to show.").dim());
                    }
                    println!();
                }
                AccountCommands::Approve {
                    account_id,
                    ovpn_username,
                    password,
                    max_devices,
                } => {
                    if let Err(e) = validate_approval(&password, &password) {
                        eprintln!("{}", yansi::Paint::new(e.to_string()).red());
                        process::exit(1);
                    }
                    let ovpn_username = match ovpn_username {
                        Some(name) => name,
                        None => {
                            // Mirror the web form's pre-fill: default the
                            // OpenVPN login to the account's username.
                            let records = match api::load_accounts(
                                &state.client,
                                &state.api_base_url,
                                &state.api_token,
                            )
                            .await
                            {
                                Ok(records) => records,
                                Err(e) => {
                                    eprintln!("{}: {}", yansi::Paint::new("Failed to load accounts").red(), e);
                                    process::exit(1);
                                }
                            };
                            match records.iter().find(|r| r.id == account_id) {
                                Some(record) => record.username.clone(),
                                None => {
                                    eprintln!(
                                        "{} {}",
                                        yansi::Paint::new("No account with id").red(),
                                        account_id
                                    );
                                    process::exit(1);
                                }
                            }
                        }
                    };
                    let request = api::ApprovalRequest {
                        ovpn_username: ovpn_username.clone(),
                        password,
                        max_devices,
                    };
                    match api::approve_account(
                        &state.client,
                        &state.api_base_url,
                        &state.api_token,
                        account_id,
                        &request,
                    )
                    .await
                    {
                        Ok(()) => println!(
                            "{} {} {}",
                            yansi::Paint::new("Account").green(),
                            account_id,
                            yansi::Paint::new(format!("provisioned as '{}'", ovpn_username)).green()
                        ),
                        Err(e) => {
                            eprintln!("{}: {}", yansi::Paint::new("Approval failed").red(), e);
                            process::exit(1);
                        }
                    }
                }
                AccountCommands::Download { username, output } => {
                    let link = match api::generate_download(
                        &state.client,
                        &state.api_base_url,
                        &state.api_token,
                        &username,
                    )
                    .await
                    {
                        Ok(link) => link,
                        Err(e) => {
                            eprintln!("{}: {}", yansi::Paint::new("Failed to generate download link").red(), e);
                            process::exit(1);
                        }
                    };
                    let path = output.unwrap_or_else(|| link.actual_filename.clone());
                    let resp = match api::fetch_config_file(
                        &state.client,
                        &state.api_base_url,
                        &state.api_token,
                        &link.download_url,
                    )
                    .await
                    {
                        Ok(resp) => resp,
                        Err(e) => {
                            eprintln!("{}: {}", yansi::Paint::new("Download failed").red(), e);
                            process::exit(1);
                        }
                    };

                    let pb = match resp.content_length() {
                        Some(len) => indicatif::ProgressBar::new(len),
                        None => indicatif::ProgressBar::new_spinner(),
                    };
                    let mut file = match tokio::fs::File::create(&path).await {
                        Ok(f) => f,
                        Err(e) => {
                            eprintln!("{} {}: {}", yansi::Paint::new("Failed to create").red(), path, e);
                            process::exit(1);
                        }
                    };
                    let mut stream = resp.bytes_stream();
                    while let Some(chunk) = stream.next().await {
                        match chunk {
                            Ok(bytes) => {
                                pb.inc(bytes.len() as u64);
                                if let Err(e) = file.write_all(&bytes).await {
                                    pb.finish_and_clear();
                                    eprintln!("{}: {}", yansi::Paint::new("Write failed").red(), e);
                                    process::exit(1);
                                }
                            }
                            Err(e) => {
                                pb.finish_and_clear();
                                eprintln!("{}: {}", yansi::Paint::new("Download interrupted").red(), e);
                                process::exit(1);
                            }
                        }
                    }
                    pb.finish_and_clear();
                    println!(
                        "{} {}",
                        yansi::Paint::new("Saved config to").green(),
                        yansi::Paint::new(&path).cyan()
                    );
                }
                AccountCommands::Delete { account_id, yes } => {
                    if !yes
                        && !confirm_on_stdin(&format!(
                            "Delete account {}? This cannot be undone.",
                            account_id
                        ))
                    {
                        println!("Aborted.");
                        return;
                    }
                    match api::delete_account(&state.client, &state.api_base_url, &state.api_token, account_id)
                        .await
                    {
                        Ok(()) => println!(
                            "{} {} {}",
                            yansi::Paint::new("Account").green(),
                            account_id,
                            yansi::Paint::new("deleted").green()
                        ),
                        Err(e) => {
                            eprintln!("{}: {}", yansi::Paint::new("Delete failed").red(), e);
                            process::exit(1);
                        }
                    }
                }
            }
        }
    }
}
