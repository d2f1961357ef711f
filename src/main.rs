use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use defect_control::aggregate::DefectSummary;
use defect_control::api::{ApiClient, DefectDetails};
use defect_control::models::{DefectFilters, DefectPriority, DefectStatus};
use defect_control::utils::validation::LoginForm;
use defect_control::workflow::{DefectWorkflow, ReportWorkflow};
use defect_control::{AppConfig, FileSessionStore, Session};

#[derive(Parser)]
#[command(name = "defect-control")]
#[command(about = "Construction defect tracking from the command line")]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate and store the session locally
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "DEFECT_CONTROL_PASSWORD")]
        password: String,
    },
    Logout,
    Whoami,
    /// List defects
    Defects {
        #[arg(long)]
        project: Option<i64>,
        #[arg(long)]
        status: Option<DefectStatus>,
        #[arg(long)]
        priority: Option<DefectPriority>,
        #[arg(long)]
        page: Option<u32>,
        /// Only defects authored by or assigned to me
        #[arg(long, default_value_t = false)]
        mine: bool,
    },
    /// Show one defect with comments and attachments
    Defect { id: i64 },
    /// Move a defect to the next status
    Advance { id: i64 },
    /// Status and priority summary
    Summary {
        #[arg(long)]
        project: Option<i64>,
        /// Aggregate the first page locally instead of asking the server
        #[arg(long, default_value_t = false)]
        local: bool,
    },
    /// Export defects as CSV
    Export {
        #[arg(long)]
        project: Option<i64>,
        #[arg(long)]
        status: Option<DefectStatus>,
        #[arg(long, short)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    log::info!("Using API at {}", config.api_base_url);

    let session = Session::hydrate(FileSessionStore::new(config.session_file.clone()))
        .context("Failed to restore session")?;
    let client = ApiClient::new(config, session).context("Failed to build HTTP client")?;

    if let Err(e) = run(&cli, &client).await {
        if e.is_unauthorized() {
            eprintln!("Session expired or invalid, run `defect-control login` again");
        }
        bail!(e.user_message());
    }
    Ok(())
}

async fn run(cli: &Cli, client: &ApiClient) -> defect_control::ClientResult<()> {
    match &cli.command {
        Commands::Login { email, password } => {
            let user = client
                .login_with_form(LoginForm {
                    email: email.trim().to_string(),
                    password: password.clone(),
                })
                .await?;
            println!("Logged in as {} ({})", user.full_name, user.role());
        }
        Commands::Logout => {
            client.logout().await?;
            println!("Logged out");
        }
        Commands::Whoami => {
            let user = client.current_user().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("{} <{}> ({})", user.full_name, user.email, user.role());
            }
        }
        Commands::Defects {
            project,
            status,
            priority,
            page,
            mine,
        } => {
            let filters = DefectFilters {
                project_id: *project,
                status: *status,
                priority: *priority,
                page: *page,
                ..Default::default()
            };
            let list = if *mine {
                client.my_defects(&filters).await?
            } else {
                client.list_defects(&filters).await?
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                let policy = client.session().policy();
                for defect in &list.defects {
                    let next = policy
                        .advance_target(defect)
                        .map(|s| format!(" -> {}", s))
                        .unwrap_or_default();
                    println!(
                        "#{:<5} [{:<11}] {:<8} {}{}",
                        defect.id, defect.status, defect.priority, defect.title, next
                    );
                }
                println!(
                    "page {}/{} ({} total)",
                    list.pagination.page, list.pagination.total_pages, list.pagination.total
                );
            }
        }
        Commands::Defect { id } => {
            let details = DefectDetails::load(client, *id).await?;
            let defect = &details.defect;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(defect)?);
            } else {
                println!("#{} {}", defect.id, defect.title);
                println!("status: {}  priority: {}", defect.status, defect.priority);
                if let Some(deadline) = defect.deadline {
                    let overdue = if defect.is_overdue(Utc::now()) { " (overdue)" } else { "" };
                    println!("deadline: {}{}", deadline.format("%Y-%m-%d"), overdue);
                }
                if !defect.description.is_empty() {
                    println!("\n{}\n", defect.description);
                }
                println!("comments: {}", details.comments.len());
                for comment in &details.comments {
                    let author = comment
                        .author
                        .as_ref()
                        .map(|u| u.full_name.as_str())
                        .unwrap_or("unknown");
                    println!("  - {}: {}", author, comment.text);
                }
                println!("attachments: {}", details.attachments.len());
                for attachment in &details.attachments {
                    println!("  - {} ({} bytes)", attachment.filename, attachment.file_size);
                }
            }
        }
        Commands::Advance { id } => {
            let defect = client.get_defect(*id).await?;
            let updated = DefectWorkflow::new(client).advance(&defect).await?;
            println!("Defect #{}: {} -> {}", updated.id, defect.status, updated.status);
        }
        Commands::Summary { project, local } => {
            let filters = DefectFilters {
                project_id: *project,
                ..Default::default()
            };
            let reports = ReportWorkflow::new(client);
            let summary = if *local {
                reports.local_summary(&filters).await?
            } else {
                reports.summary(&filters).await?
            };
            print_summary(&summary, cli.json)?;
        }
        Commands::Export {
            project,
            status,
            output,
        } => {
            let filters = DefectFilters {
                project_id: *project,
                status: *status,
                ..Default::default()
            };
            let csv = ReportWorkflow::new(client).export_csv(&filters).await?;
            std::fs::write(output, &csv)?;
            println!("Wrote {} bytes to {}", csv.len(), output.display());
        }
    }
    Ok(())
}

fn print_summary(summary: &DefectSummary, json: bool) -> defect_control::ClientResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    println!(
        "📊 Defects: {} total, {} open, {} overdue",
        summary.total,
        summary.open(),
        summary.overdue
    );
    println!("   ✅ Completion: {:.1}%", summary.completion_percentage);
    if let Some(hours) = summary.average_resolution_hours {
        println!("   ⏱  Average resolution: {:.1}h", hours);
    }
    for (status, count) in &summary.by_status {
        println!("   {:<12} {}", status.as_str(), count);
    }
    for (priority, count) in &summary.by_priority {
        println!("   {:<12} {}", priority.as_str(), count);
    }
    Ok(())
}
