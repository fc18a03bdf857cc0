//! Labdesk command-line front end.
//!
//! Drives the laboratory REST backend: login/logout, guarded collection
//! listing with search and pagination, deletions and peer moderation.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Table};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use labdesk::api::ModerationAction;
use labdesk::auth::{self, Access, GuardState, RouteGuard, ADMIN_HOME, MEMBER_HOME};
use labdesk::entities::{self, EntityConfig};
use labdesk::listing::{Confirm, ListManager};
use labdesk::models::{LoginRequest, PublicationKind, RecordId};
use labdesk::notify::{ToastLevel, Toasts};
use labdesk::storage::FileStore;
use labdesk::validation;
use labdesk::{ApiClient, ClientError, Config, SessionStore};

#[derive(Parser)]
#[command(name = "labdesk", version, about = "Laboratory CMS administration client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LABDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Drop the persisted session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List the available collections
    Entities,
    /// Show one page of a collection
    List {
        entity: String,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Delete one or more records
    Delete {
        entity: String,
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Accept or reject pending submissions
    Moderate {
        entity: String,
        #[arg(value_enum)]
        action: ModerationArg,
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        yes: bool,
    },
    /// Validate a DOI, and check it is unused when logged in
    CheckDoi {
        doi: String,
        #[arg(long, default_value = "articles")]
        kind: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModerationArg {
    Accept,
    Reject,
}

impl From<ModerationArg> for ModerationAction {
    fn from(arg: ModerationArg) -> Self {
        match arg {
            ModerationArg::Accept => ModerationAction::Accept,
            ModerationArg::Reject => ModerationAction::Reject,
        }
    }
}

/// Confirmation read from the terminal.
struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    tracing::debug!("Backend: {}", config.api_url);
    tracing::debug!("Session file: {:?}", config.session_path);

    let storage = Arc::new(FileStore::new(config.session_path.clone()));
    let session = SessionStore::restore(storage)?;
    let client = ApiClient::new(&config, session)?;
    let toasts = Toasts::new();

    let result = run(cli.command, &config, &client, &toasts).await;
    print_toasts(&toasts);
    result.map_err(Into::into)
}

async fn run(
    command: Command,
    config: &Config,
    client: &ApiClient,
    toasts: &Toasts,
) -> Result<(), ClientError> {
    match command {
        Command::Login { email, password } => {
            let outcome = auth::login(client, &LoginRequest { email, password }, None, toasts).await?;
            println!("Logged in as {} -> {}", outcome.user.name, outcome.redirect);
            Ok(())
        }
        Command::Logout => {
            auth::logout(client, toasts);
            Ok(())
        }
        Command::Whoami => {
            guard(client, Access::Member, MEMBER_HOME).await?;
            match client.session().current_user() {
                Some(user) => println!("{} <{}> ({})", user.name, user.email, user.role.as_str()),
                None => println!("Not logged in"),
            }
            Ok(())
        }
        Command::Entities => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["key", "label", "path", "access"]);
            for entry in entities::catalog() {
                table.add_row(vec![
                    entry.key.to_string(),
                    entry.label.to_string(),
                    entry.path.to_string(),
                    format!("{:?}", entry.access),
                ]);
            }
            println!("{table}");
            Ok(())
        }
        Command::List {
            entity,
            search,
            page,
        } => {
            let mut list = open(client, config, toasts, &entity).await?;
            if let Some(query) = search {
                list.set_query(query);
            }
            list.go_to_page(page);
            print_page(&list);
            Ok(())
        }
        Command::Delete { entity, ids, yes } => {
            let mut list = open(client, config, toasts, &entity).await?;
            let ids = known_ids(&list, &ids, toasts);
            let confirm = confirmer(yes);
            act(&mut list, client, &ids, &*confirm, None).await
        }
        Command::Moderate {
            entity,
            action,
            ids,
            yes,
        } => {
            let mut list = open(client, config, toasts, &entity).await?;
            let ids = known_ids(&list, &ids, toasts);
            let confirm = confirmer(yes);
            act(&mut list, client, &ids, &*confirm, Some(action.into())).await
        }
        Command::CheckDoi { doi, kind } => {
            validation::validate_doi(&doi, true)?;
            println!("{} is a valid DOI", doi.trim());

            let kind = PublicationKind::ALL
                .into_iter()
                .find(|k| EntityConfig::publications(*k).key == kind)
                .ok_or_else(|| ClientError::field("kind", format!("Unknown publication kind: {}", kind)))?;
            if client.session().is_authenticated() {
                if client.doi_exists(kind.doi_check_path(), &doi).await? {
                    println!("{} is already registered", doi.trim());
                } else {
                    println!("{} is not registered yet", doi.trim());
                }
            }
            Ok(())
        }
    }
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(|_: &str| true)
    } else {
        Box::new(PromptConfirm)
    }
}

/// Resolve the route guard; anything but authorized is an error.
async fn guard(client: &ApiClient, access: Access, location: &str) -> Result<(), ClientError> {
    if let Err(e) = auth::ensure_current_user(client).await {
        tracing::debug!("Could not load current user: {}", e);
    }

    let mut guard = RouteGuard::new(access, location);
    match guard.evaluate(&client.session().snapshot(), client).await {
        GuardState::Authorized => Ok(()),
        GuardState::Unauthorized(redirect) => Err(ClientError::Unauthorized(format!(
            "Access to {} denied, log in first ({})",
            redirect.from, redirect.to
        ))),
        GuardState::Loading => Err(ClientError::Unauthorized(
            "Session verification did not finish".to_string(),
        )),
    }
}

/// Guard and load one collection screen.
async fn open(
    client: &ApiClient,
    config: &Config,
    toasts: &Toasts,
    key: &str,
) -> Result<ListManager, ClientError> {
    let mut entity = entities::find(key)
        .ok_or_else(|| ClientError::NotFound(format!("Unknown collection: {}", key)))?;
    entity.page_size.get_or_insert(config.page_size);

    let area = match entity.access {
        Access::Admin => ADMIN_HOME,
        Access::Member => MEMBER_HOME,
    };
    guard(client, entity.access, &format!("{}/{}", area, entity.key)).await?;

    let mut list = ListManager::new(entity, toasts.clone());
    list.load(client, &client.session().snapshot()).await?;
    Ok(list)
}

fn known_ids(list: &ListManager, raw: &[String], toasts: &Toasts) -> Vec<RecordId> {
    let mut ids = Vec::new();
    for raw_id in raw {
        let id = RecordId::new(raw_id.trim());
        if ids.contains(&id) {
            continue;
        }
        if list.contains(&id) {
            ids.push(id);
        } else {
            toasts.warning(format!("No {} with id {}", list.config().key, id));
        }
    }
    ids
}

async fn act(
    list: &mut ListManager,
    client: &ApiClient,
    ids: &[RecordId],
    confirm: &dyn Confirm,
    moderation: Option<ModerationAction>,
) -> Result<(), ClientError> {
    match ids {
        [] => Ok(()),
        [id] => {
            match moderation {
                Some(action) => list.moderate_one(client, action, id, confirm).await?,
                None => list.delete_one(client, id, confirm).await?,
            };
            Ok(())
        }
        many => {
            for id in many {
                list.select_row(id.clone());
            }
            let report = match moderation {
                Some(action) => list.moderate_selected(client, action, confirm).await,
                None => list.delete_selected(client, confirm).await,
            };
            // Partial failures were already reported per item; surface the first one.
            match report.and_then(|report| report.failed.into_iter().next()) {
                Some((_, error)) => Err(error),
                None => Ok(()),
            }
        }
    }
}

fn print_page(list: &ListManager) {
    if let Some(error) = list.error() {
        eprintln!("{}", error);
    }

    let columns = list.config().columns;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    let mut header = vec!["id".to_string()];
    header.extend(columns.iter().map(|c| c.to_string()));
    table.set_header(header);

    for record in list.visible() {
        let mut row = vec![record.id().map(|id| id.to_string()).unwrap_or_default()];
        row.extend(columns.iter().map(|c| record.text(c)));
        table.add_row(row);
    }
    println!("{table}");
    println!(
        "{}: page {} of {} ({} matching, {} total)",
        list.config().label,
        list.current_page(),
        list.page_count().max(1),
        list.filtered_len(),
        list.items().len()
    );
}

fn print_toasts(toasts: &Toasts) {
    for toast in toasts.drain() {
        let tag = match toast.level {
            ToastLevel::Success => "ok",
            ToastLevel::Info => "info",
            ToastLevel::Warning => "warning",
            ToastLevel::Error => "error",
        };
        eprintln!("[{}] {}", tag, toast.message);
    }
}
