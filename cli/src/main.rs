//! Tag Manager command-line client
//!
//! Lists accounts, containers and workspaces, and runs the bulk workspace
//! operations (preview, clear, version, sync) from a shell.
//!
//! Usage:
//!   gtm --credentials credentials.json accounts
//!   gtm containers accounts/123
//!   gtm create-version accounts/123/containers/456/workspaces/7 --name "Release" --publish
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gtm_client::gtm_model::{Resource, ResourceKind};
use gtm_client::{CredentialsFile, GatewayConfig, Manager, SyncOutcome};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "gtm")]
#[command(about = "Tag Manager resource-tree client")]
struct Args {
    /// Path to a gateway config file (JSON); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the OAuth2 credentials file (JSON)
    #[arg(long, global = true, default_value = "credentials.json")]
    credentials: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every accessible account
    Accounts,
    /// List the containers of an account
    Containers { account: String },
    /// List the workspaces of a container
    Workspaces { container: String },
    /// Print the compiled preview of a workspace
    Preview { workspace: String },
    /// Print trigger names and ids, in both directions
    TriggerMap { workspace: String },
    /// Print folder names and ids, in both directions
    FolderMap { workspace: String },
    /// Delete every tag, trigger, variable and folder of a workspace
    Clear { workspace: String },
    /// Create a version from a workspace
    CreateVersion {
        workspace: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// Publish the new version right away
        #[arg(long)]
        publish: bool,
    },
    /// Bring a workspace up to date with the latest version
    Sync { workspace: String },
    /// Print the pending changes of a workspace
    Status { workspace: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let manager = connect(&args)?;
    let output = run(&manager, args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn connect(args: &Args) -> Result<Manager> {
    let config = match &args.config {
        Some(path) => GatewayConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GatewayConfig::default(),
    };
    let credentials = CredentialsFile::from_file(&args.credentials)
        .with_context(|| format!("loading credentials from {}", args.credentials.display()))?;

    Manager::with_credentials(config, credentials).context("building the API gateway")
}

async fn run(manager: &Manager, command: Command) -> Result<Value> {
    match command {
        Command::Accounts => {
            let accounts = manager.list_accounts().await?;
            summaries(accounts.iter().map(|a| a.resource()))
        }
        Command::Containers { account } => {
            let mut account = manager.account(&account).await?;
            let containers = account.list_containers(false).await?;
            summaries(containers.iter().map(|c| c.resource()))
        }
        Command::Workspaces { container } => {
            let mut container = manager.container(&container).await?;
            let workspaces = container.list_workspaces(false).await?;
            summaries(workspaces.iter().map(|w| w.resource()))
        }
        Command::Preview { workspace } => {
            let mut workspace = manager.workspace(&workspace).await?;
            Ok(workspace.quick_preview(false).await?.to_value()?)
        }
        Command::TriggerMap { workspace } => {
            let mut workspace = manager.workspace(&workspace).await?;
            Ok(json!(workspace.trigger_map(false).await?))
        }
        Command::FolderMap { workspace } => {
            let mut workspace = manager.workspace(&workspace).await?;
            Ok(json!(workspace.folder_map(false).await?))
        }
        Command::Clear { workspace } => {
            let mut workspace = manager.workspace(&workspace).await?;
            let report = workspace.clear_all_assets(true).await?;
            if report.variables_remaining > 0 {
                warn!(
                    "{} variables could not be deleted",
                    report.variables_remaining
                );
            }
            Ok(json!({
                "tagsDeleted": report.tags_deleted,
                "triggersDeleted": report.triggers_deleted,
                "variableRounds": report.variable_rounds,
                "variablesRemaining": report.variables_remaining,
                "foldersDeleted": report.folders_deleted,
            }))
        }
        Command::CreateVersion {
            workspace,
            name,
            notes,
            publish,
        } => {
            let workspace = manager.workspace(&workspace).await?;
            let version = workspace.create_version(&name, &notes).await?;
            info!(
                "Created version {}",
                version.container_version_id().unwrap_or_default()
            );

            let mut output = json!({ "version": summary(version.resource()) });
            if publish {
                let outcome = version.publish().await?;
                output["compilerError"] = json!(outcome.compiler_error);
                output["published"] = json!(outcome.version.is_some());
            }
            Ok(output)
        }
        Command::Sync { workspace } => {
            let workspace = manager.workspace(&workspace).await?;
            sync_report(&workspace.sync().await?)
        }
        Command::Status { workspace } => {
            let workspace = manager.workspace(&workspace).await?;
            Ok(serde_json::to_value(workspace.get_status().await?)?)
        }
    }
}

fn summary<K: ResourceKind>(resource: &Resource<K>) -> Value {
    json!({
        "path": resource.path(),
        "id": resource.id(),
        "name": resource.name(),
    })
}

fn summaries<'a, K: ResourceKind>(
    resources: impl Iterator<Item = &'a Resource<K>>,
) -> Result<Value> {
    Ok(Value::Array(resources.map(summary).collect()))
}

fn sync_report(outcome: &SyncOutcome) -> Result<Value> {
    let conflicts = outcome
        .merge_conflicts
        .iter()
        .map(|c| c.to_value())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({
        "mergeConflict": outcome.status.merge_conflict,
        "syncError": outcome.status.sync_error,
        "conflicts": conflicts,
    }))
}
