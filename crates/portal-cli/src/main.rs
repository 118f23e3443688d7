//! Portal CLI: command-line client for the college file portal.
//!
//! Set PORTAL_URL and PORTAL_SESSION_COOKIE (the `sessionid` cookie of a logged-in
//! browser session). The CSRF token is discovered from PORTAL_CSRF_PAGE unless
//! PORTAL_CSRF_TOKEN is set.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use portal_api_client::{ApiClient, PortalApi};
use portal_cli::{
    batch_report_json, collect_upload_items, file_refs, init_tracing, render_tree,
    LogRefreshListener,
};
use portal_core::models::{CreateFolderRequest, UploadContext};
use portal_core::{ClientConfig, FolderPath, FolderPlan};
use portal_services::{
    DragSession, FolderUploader, MoveOptions, MoveOutcome, MoveValidator, RefreshNotifier,
};

#[derive(Parser)]
#[command(name = "portal", about = "College file portal CLI")]
struct Cli {
    /// Portal base URL (overrides PORTAL_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files and folders, recreating directory structure remotely
    Upload {
        /// Files or directories to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Academic session id (defaults to PORTAL_ACADEMIC_SESSION)
        #[arg(long)]
        session: Option<i64>,
        /// Department id (defaults to PORTAL_DEPARTMENT)
        #[arg(long)]
        department: Option<i64>,
        /// Destination folder id; omit to upload to the department root
        #[arg(long)]
        parent: Option<i64>,
        /// Make created folders and files public
        #[arg(long)]
        public: bool,
        /// Print the folders that would be created and where each file goes
        #[arg(long)]
        dry_run: bool,
    },
    /// Move a folder under another folder
    MoveFolder {
        /// Folder to move
        folder: i64,
        /// Target parent folder
        #[arg(long)]
        to: i64,
        /// Only reject moves onto the folder itself, skipping the ancestor walk
        #[arg(long)]
        no_ancestor_check: bool,
    },
    /// Move one or more files into a folder
    MoveFiles {
        /// File ids; more than one moves each independently and reports a summary
        #[arg(required = true)]
        files: Vec<i64>,
        /// Target folder
        #[arg(long)]
        to: i64,
    },
    /// Folder operations
    Folder {
        #[command(subcommand)]
        sub: FolderCommands,
    },
    /// Show the folder tree of a session/department
    Browse {
        #[arg(long)]
        session: Option<i64>,
        #[arg(long)]
        department: Option<i64>,
        /// Print raw JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
    /// Check that an anti-forgery token can be obtained
    Csrf,
}

#[derive(Subcommand)]
enum FolderCommands {
    /// Create a new folder
    Create {
        /// Folder name
        name: String,
        /// Parent folder id
        #[arg(long)]
        parent: Option<i64>,
        #[arg(long)]
        session: Option<i64>,
        #[arg(long)]
        department: Option<i64>,
        #[arg(long)]
        public: bool,
    },
    /// List subfolders and files of a folder
    Children {
        /// Folder id
        id: i64,
    },
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context(
        "Failed to load configuration. Set PORTAL_URL and PORTAL_SESSION_COOKIE",
    )?;
    if let Some(url) = cli.url {
        config.base_url = url.trim_end_matches('/').to_string();
        config.validate().context("Invalid --url")?;
    }

    let client = Arc::new(ApiClient::new(&config).context("Failed to create API client")?);
    let notifier = RefreshNotifier::new().with_listener(Arc::new(LogRefreshListener));

    match cli.command {
        Commands::Upload {
            paths,
            session,
            department,
            parent,
            public,
            dry_run,
        } => {
            let items = collect_upload_items(&paths)?;
            if dry_run {
                let plan = FolderPlan::from_items(&items);
                let files: Vec<serde_json::Value> = items
                    .iter()
                    .map(|item| {
                        serde_json::json!({
                            "file": item.display_name(),
                            "folder": FolderPath::directory_of(item.relative_path()).to_string(),
                        })
                    })
                    .collect();
                let folders: Vec<String> =
                    plan.folders_to_create().map(ToString::to_string).collect();
                print_json(&serde_json::json!({ "folders": folders, "files": files }))?;
                return Ok(());
            }

            let context = UploadContext {
                session: session.or(config.default_session),
                department: department.or(config.default_department),
                parent,
                is_public: public,
            };

            let uploader = FolderUploader::new(client.clone(), notifier);
            let summary = uploader.upload(&items, &context).await?;

            let folders: Vec<serde_json::Value> = summary
                .folders
                .iter()
                .map(|f| serde_json::json!({ "path": f.path, "id": f.id, "parent": f.parent }))
                .collect();
            let files: Vec<serde_json::Value> = summary
                .files
                .iter()
                .map(|f| serde_json::json!({ "path": f.path, "id": f.id, "folder": f.folder }))
                .collect();
            print_json(&serde_json::json!({ "folders": folders, "files": files }))?;
        }
        Commands::MoveFolder {
            folder,
            to,
            no_ancestor_check,
        } => {
            let options = MoveOptions {
                check_ancestors: !no_ancestor_check,
                max_ancestor_depth: config.max_ancestor_depth,
            };
            let validator = MoveValidator::with_options(client.clone(), notifier, options);
            validator
                .drop_on(&DragSession::Folder(Some(folder)), Some(to))
                .await?;
            print_json(&serde_json::json!({ "success": true, "folder": folder, "parent": to }))?;
        }
        Commands::MoveFiles { files, to } => {
            let validator = MoveValidator::new(client.clone(), notifier);
            let mut refs = file_refs(&files);
            let drag = if refs.len() == 1 {
                DragSession::File(refs.remove(0))
            } else {
                DragSession::Files(refs)
            };

            match validator.drop_on(&drag, Some(to)).await? {
                MoveOutcome::Batch(report) => {
                    print_json(&batch_report_json(&report))?;
                    if !report.is_complete_success() {
                        anyhow::bail!("{}", report);
                    }
                }
                _ => {
                    print_json(&serde_json::json!({ "success": true, "folder": to }))?;
                }
            }
        }
        Commands::Folder { sub } => match sub {
            FolderCommands::Create {
                name,
                parent,
                session,
                department,
                public,
            } => {
                let (session, department) = UploadContext {
                    session: session.or(config.default_session),
                    department: department.or(config.default_department),
                    ..Default::default()
                }
                .require()?;

                let response = client
                    .create_folder(&CreateFolderRequest {
                        session,
                        department,
                        name,
                        parent,
                        is_public: public,
                    })
                    .await?;
                notifier.notify_all();
                print_json(&response)?;
            }
            FolderCommands::Children { id } => {
                let response = client.folder_children(id).await?;
                print_json(&response)?;
            }
        },
        Commands::Browse {
            session,
            department,
            json,
        } => {
            let (session, department) = UploadContext {
                session: session.or(config.default_session),
                department: department.or(config.default_department),
                ..Default::default()
            }
            .require()?;

            let browse = client.browse_session(session, department).await?;
            if json {
                print_json(&browse)?;
            } else {
                print!("{}", render_tree(&browse));
            }
        }
        Commands::Csrf => {
            let token = client.csrf_token().await?;
            print_json(&serde_json::json!({ "found": true, "source": format!("{:?}", token.source()) }))?;
        }
    }

    Ok(())
}
