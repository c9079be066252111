use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use quillpost::api::posts::PostDraft;
use quillpost::api::types::Role;
use quillpost::guard::{self, GuardDecision};
use quillpost::validation::{self, ValidationError};
use quillpost::{ApiError, BlogClient, BootPolicy, ClientConfig, ClientError, ConfigError, Session, api};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("sign in required; run `quillpost login` first")]
    SignInRequired { from: Option<String> },
    #[error("this command is only available to administrators")]
    Forbidden,
    #[error("failed to read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl CliError {
    fn code(&self) -> &str {
        match self {
            Self::Config(e) => e.code(),
            Self::Client(e) => e.code(),
            Self::Api(e) => e.code(),
            Self::Validation(e) => e.code(),
            Self::SignInRequired { .. } => "AUTH_REQUIRED",
            Self::Forbidden => "FORBIDDEN",
            Self::ReadFile { .. } => "IO_ERROR",
            Self::InvalidJson(_) => "INVALID_JSON",
        }
    }

    /// Structured form printed on stderr.
    fn to_json(&self) -> Value {
        let mut out = json!({ "code": self.code(), "message": self.to_string() });
        match self {
            Self::Api(e) => {
                out["message"] = json!(e.message);
                out["status"] = json!(e.status);
                if let Some(request_id) = &e.request_id {
                    out["requestId"] = json!(request_id);
                }
                if let Some(details) = &e.details {
                    out["details"] = details.clone();
                }
            }
            Self::Validation(e) => out["field"] = json!(e.field),
            Self::SignInRequired { from: Some(from) } => out["from"] = json!(from),
            _ => {}
        }
        out
    }
}

#[derive(Parser, Debug)]
#[command(name = "quillpost", about = "Quillpost blog client")]
struct Cli {
    #[arg(long, env = "QUILLPOST_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "QUILLPOST_SESSION_DIR")]
    session_dir: Option<PathBuf>,

    /// `optimistic` or `strict`.
    #[arg(long, env = "QUILLPOST_BOOT_POLICY")]
    boot_policy: Option<BootPolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current session.
    Whoami,
    Login {
        username: String,
        #[arg(long, env = "QUILLPOST_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        username: String,
        #[arg(long, env = "QUILLPOST_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Change the current user's password.
    Passwd(PasswdArgs),
    Posts(PostsCommand),
    Search {
        q: String,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    Collections(CollectionsCommand),
    Like {
        post_id: i64,
    },
    Unlike {
        post_id: i64,
    },
    Favorite {
        post_id: i64,
    },
    Unfavorite {
        post_id: i64,
    },
    Interactions {
        post_id: i64,
    },
    Comments(CommentsCommand),
    Admin(AdminCommand),
    /// Print the guard decision for an application route.
    Route {
        path: String,
    },
}

#[derive(Args, Debug)]
struct PasswdArgs {
    #[arg(long)]
    current: String,
    #[arg(long)]
    new: String,
    #[arg(long)]
    confirm: String,
}

#[derive(Args, Debug)]
struct PostsCommand {
    #[command(subcommand)]
    command: PostsSubcommand,
}

#[derive(Args, Debug)]
struct PostBody {
    #[arg(long)]
    title: String,
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    content: Option<String>,
    /// Read the Markdown body from a file.
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum PostsSubcommand {
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Posts written by the current user.
    Mine {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Posts favorited by the current user.
    Favorites {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    Get {
        id: i64,
    },
    Create(PostBody),
    Update {
        id: i64,
        #[command(flatten)]
        body: PostBody,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct CollectionsCommand {
    #[command(subcommand)]
    command: CollectionsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CollectionsSubcommand {
    Mine,
    Get {
        id: i64,
    },
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Add {
        collection_id: i64,
        post_id: i64,
    },
    Remove {
        collection_id: i64,
        post_id: i64,
    },
    /// Collections containing a post, with navigation inside `--collection`.
    OfPost {
        post_id: i64,
        #[arg(long)]
        collection: Option<i64>,
    },
}

#[derive(Args, Debug)]
struct CommentsCommand {
    #[command(subcommand)]
    command: CommentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CommentsSubcommand {
    List {
        post_id: i64,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    Add {
        post_id: i64,
        content: String,
    },
    Delete {
        comment_id: i64,
    },
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    Users {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    Role {
        user_id: i64,
        #[arg(value_parser = parse_role)]
        role: Role,
    },
    Ban {
        user_id: i64,
        /// Lift the ban instead of applying it.
        #[arg(long)]
        unban: bool,
    },
}

/// Local access check applied before a command reaches the server.
#[derive(Debug, PartialEq, Eq)]
enum Gate {
    Open,
    /// Guard of the application route the command stands in for.
    Route(String),
    /// Needs a session but has no route of its own.
    SignedIn,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quillpost=warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.to_json());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = build_config(&cli)?;
    let client = BlogClient::from_config(&config)?;
    let report = client.start().await;
    tracing::debug!(
        policy = ?report.policy,
        used_cached_session = report.used_cached_session,
        "boot complete"
    );

    enforce(&client.session(), &gate_for(&cli.command))?;
    let result = dispatch(&client, cli.command).await;

    // Let an optimistic background refresh land before exiting.
    join_background(report.background).await;
    result
}

/// Await the optimistic boot refresh. `None` when there was none or it died.
async fn join_background(background: Option<JoinHandle<bool>>) -> Option<bool> {
    match background?.await {
        Ok(refreshed) => Some(refreshed),
        Err(e) => {
            tracing::warn!(error = %e, "background session refresh did not complete");
            None
        }
    }
}

fn build_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.trim().trim_end_matches('/').to_owned();
    }
    if let Some(dir) = &cli.session_dir {
        config.session_dir.clone_from(dir);
    }
    if let Some(policy) = cli.boot_policy {
        config.boot_policy = policy;
    }
    Ok(config)
}

fn parse_role(raw: &str) -> Result<Role, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "user" => Ok(Role::User),
        "admin" => Ok(Role::Admin),
        other => Err(format!("unknown role `{other}` (expected user or admin)")),
    }
}

fn gate_for(command: &Command) -> Gate {
    match command {
        Command::Passwd(_) => Gate::Route("/account/password".to_owned()),
        Command::Posts(posts) => match &posts.command {
            PostsSubcommand::Create(_) => Gate::Route("/editor/new".to_owned()),
            PostsSubcommand::Update { id, .. } => Gate::Route(format!("/editor/{id}")),
            PostsSubcommand::Mine { .. } | PostsSubcommand::Favorites { .. } | PostsSubcommand::Delete { .. } => {
                Gate::SignedIn
            }
            PostsSubcommand::List { .. } | PostsSubcommand::Get { .. } => Gate::Open,
        },
        Command::Collections(collections) => match &collections.command {
            CollectionsSubcommand::Mine | CollectionsSubcommand::Create { .. } => {
                Gate::Route("/collections".to_owned())
            }
            CollectionsSubcommand::Add { .. } | CollectionsSubcommand::Remove { .. } => Gate::SignedIn,
            CollectionsSubcommand::Get { .. } | CollectionsSubcommand::OfPost { .. } => Gate::Open,
        },
        Command::Like { .. } | Command::Unlike { .. } | Command::Favorite { .. } | Command::Unfavorite { .. } => {
            Gate::SignedIn
        }
        Command::Comments(comments) => match &comments.command {
            CommentsSubcommand::Add { .. } | CommentsSubcommand::Delete { .. } => Gate::SignedIn,
            CommentsSubcommand::List { .. } => Gate::Open,
        },
        Command::Admin(_) => Gate::Route("/admin/users".to_owned()),
        Command::Whoami
        | Command::Login { .. }
        | Command::Register { .. }
        | Command::Logout
        | Command::Search { .. }
        | Command::Interactions { .. }
        | Command::Route { .. } => Gate::Open,
    }
}

fn enforce(session: &Session, gate: &Gate) -> Result<(), CliError> {
    let decision = match gate {
        Gate::Open => return Ok(()),
        Gate::Route(path) => guard::guard_route(session, path),
        Gate::SignedIn => guard::protected(session, guard::HOME_PATH),
    };
    match decision {
        GuardDecision::Allow | GuardDecision::NotFound => Ok(()),
        GuardDecision::RedirectToLogin { from } => Err(CliError::SignInRequired { from }),
        GuardDecision::Forbidden => Err(CliError::Forbidden),
    }
}

async fn dispatch(client: &BlogClient, command: Command) -> Result<(), CliError> {
    let gateway = client.gateway();
    match command {
        Command::Whoami => print_json(&session_json(&client.session())),
        Command::Login { username, password } => {
            let payload = client.login(username.trim(), &password).await?;
            print_json(&json!({ "user": payload.user }))
        }
        Command::Register { username, password } => {
            let username = username.trim();
            validation::validate_username(username)?;
            validation::validate_password(&password)?;
            let payload = api::auth::register(gateway, username, &password).await?;
            print_json(&json!({ "user": payload.user }))
        }
        Command::Logout => {
            let result = client.logout().await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "server logout failed; local session cleared anyway");
            }
            print_json(&json!({ "ok": result.is_ok() }))
        }
        Command::Passwd(args) => {
            validation::validate_password_change(&args.current, &args.new, &args.confirm)?;
            let payload = api::auth::change_password(gateway, &args.current, &args.new).await?;
            print_json(&json!({ "user": payload.user }))
        }
        Command::Posts(posts) => run_posts(client, posts.command).await,
        Command::Search { q, page, page_size } => {
            let q = q.trim();
            validation::validate_search_query(q)?;
            print_json(&serde_json::to_value(api::search::search_posts(gateway, q, page, page_size).await?)?)
        }
        Command::Collections(collections) => run_collections(client, collections.command).await,
        Command::Like { post_id } => print_json(&serde_json::to_value(api::interactions::like_post(gateway, post_id).await?)?),
        Command::Unlike { post_id } => {
            print_json(&serde_json::to_value(api::interactions::unlike_post(gateway, post_id).await?)?)
        }
        Command::Favorite { post_id } => {
            print_json(&serde_json::to_value(api::interactions::favorite_post(gateway, post_id).await?)?)
        }
        Command::Unfavorite { post_id } => {
            print_json(&serde_json::to_value(api::interactions::unfavorite_post(gateway, post_id).await?)?)
        }
        Command::Interactions { post_id } => {
            print_json(&serde_json::to_value(api::interactions::get_post_interactions(gateway, post_id).await?)?)
        }
        Command::Comments(comments) => run_comments(client, comments.command).await,
        Command::Admin(admin) => run_admin(client, admin.command).await,
        Command::Route { path } => print_json(&decision_json(&path, &client.guard(&path))),
    }
}

async fn run_posts(client: &BlogClient, command: PostsSubcommand) -> Result<(), CliError> {
    let gateway = client.gateway();
    let value = match command {
        PostsSubcommand::List { page, page_size } => {
            serde_json::to_value(api::posts::list_posts(gateway, page, page_size).await?)?
        }
        PostsSubcommand::Mine { page, page_size } => {
            serde_json::to_value(api::posts::list_my_posts(gateway, page, page_size).await?)?
        }
        PostsSubcommand::Favorites { page, page_size } => {
            serde_json::to_value(api::posts::list_my_favorites(gateway, page, page_size).await?)?
        }
        PostsSubcommand::Get { id } => serde_json::to_value(api::posts::get_post(gateway, id).await?)?,
        PostsSubcommand::Create(body) => {
            let draft = read_draft(body)?;
            serde_json::to_value(api::posts::create_post(gateway, &draft).await?)?
        }
        PostsSubcommand::Update { id, body } => {
            let draft = read_draft(body)?;
            serde_json::to_value(api::posts::update_post(gateway, id, &draft).await?)?
        }
        PostsSubcommand::Delete { id } => serde_json::to_value(api::posts::delete_post(gateway, id).await?)?,
    };
    print_json(&value)
}

async fn run_collections(client: &BlogClient, command: CollectionsSubcommand) -> Result<(), CliError> {
    let gateway = client.gateway();
    let value = match command {
        CollectionsSubcommand::Mine => serde_json::to_value(api::collections::list_my_collections(gateway).await?)?,
        CollectionsSubcommand::Get { id } => serde_json::to_value(api::collections::get_collection(gateway, id).await?)?,
        CollectionsSubcommand::Create { name, description } => {
            let name = name.trim();
            let description = description.trim();
            validation::validate_collection_name(name)?;
            validation::validate_collection_description(description)?;
            serde_json::to_value(api::collections::create_collection(gateway, name, description).await?)?
        }
        CollectionsSubcommand::Add { collection_id, post_id } => {
            serde_json::to_value(api::collections::add_post_to_collection(gateway, collection_id, post_id).await?)?
        }
        CollectionsSubcommand::Remove { collection_id, post_id } => serde_json::to_value(
            api::collections::remove_post_from_collection(gateway, collection_id, post_id).await?,
        )?,
        CollectionsSubcommand::OfPost { post_id, collection } => {
            serde_json::to_value(api::collections::get_post_collections(gateway, post_id, collection).await?)?
        }
    };
    print_json(&value)
}

async fn run_comments(client: &BlogClient, command: CommentsSubcommand) -> Result<(), CliError> {
    let gateway = client.gateway();
    let value = match command {
        CommentsSubcommand::List { post_id, page, page_size } => {
            serde_json::to_value(api::interactions::list_comments(gateway, post_id, page, page_size).await?)?
        }
        CommentsSubcommand::Add { post_id, content } => {
            let content = content.trim();
            validation::validate_comment(content)?;
            serde_json::to_value(api::interactions::create_comment(gateway, post_id, content).await?)?
        }
        CommentsSubcommand::Delete { comment_id } => {
            serde_json::to_value(api::interactions::delete_comment(gateway, comment_id).await?)?
        }
    };
    print_json(&value)
}

async fn run_admin(client: &BlogClient, command: AdminSubcommand) -> Result<(), CliError> {
    let gateway = client.gateway();
    let value = match command {
        AdminSubcommand::Users { page, page_size } => {
            serde_json::to_value(api::admin::list_users(gateway, page, page_size).await?)?
        }
        AdminSubcommand::Role { user_id, role } => {
            serde_json::to_value(api::admin::update_user_role(gateway, user_id, role).await?)?
        }
        AdminSubcommand::Ban { user_id, unban } => {
            serde_json::to_value(api::admin::update_user_ban(gateway, user_id, !unban).await?)?
        }
    };
    print_json(&value)
}

fn read_draft(body: PostBody) -> Result<PostDraft, CliError> {
    let content = match (body.content, body.file) {
        (Some(content), _) => content,
        (None, Some(path)) => std::fs::read_to_string(&path).map_err(|source| CliError::ReadFile { path, source })?,
        (None, None) => String::new(),
    };
    let title = body.title.trim().to_owned();
    validation::validate_title(&title)?;
    validation::validate_content(&content)?;
    Ok(PostDraft::new(title, content))
}

fn session_json(session: &Session) -> Value {
    match session.user() {
        Some(user) => json!({ "authenticated": true, "user": user }),
        None => json!({ "authenticated": false, "user": null }),
    }
}

fn decision_json(path: &str, decision: &GuardDecision) -> Value {
    match decision {
        GuardDecision::Allow => json!({ "path": path, "decision": "allow" }),
        GuardDecision::RedirectToLogin { from } => json!({
            "path": path,
            "decision": "redirect",
            "location": guard::LOGIN_PATH,
            "from": from,
            "afterLogin": guard::post_login_redirect(from.as_deref()),
        }),
        GuardDecision::Forbidden => json!({ "path": path, "decision": "forbidden" }),
        GuardDecision::NotFound => json!({ "path": path, "decision": "not_found" }),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
