//! Vendorboard CLI - vendor, product and assessment analysis management.

mod config;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vendorboard_client::HttpBackend;
use vendorboard_core::{
    AssessmentId, CreateProduct, CreateVendor, PhaseSequence, ProductId, Session, UpdateProduct,
    UpdateVendor, VendorId,
};
use vendorboard_progress::{ProgressWeighting, StepperConfig, StepperDriver};
use vendorboard_services::{
    AnalysisOrchestrator, AnalysisOutcome, DashboardService, OrchestratorConfig, ProductService,
    RecordingNotifier, ServiceContext, StatusOutcome, VendorService,
};

use crate::config::{FileConfig, Overrides, Settings};

#[derive(Parser)]
#[command(name = "vendorboard")]
#[command(about = "Vendor and product management with repository assessment analysis", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Backend base URL
    #[arg(long, env = "VENDORBOARD_API_URL", global = true)]
    api_url: Option<String>,

    /// Bearer token
    #[arg(long, env = "VENDORBOARD_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// User name recorded in the session
    #[arg(long, global = true)]
    user: Option<String>,

    /// JSON config file
    #[arg(long, env = "VENDORBOARD_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage vendors
    Vendors {
        #[command(subcommand)]
        command: VendorCommand,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        command: ProductCommand,
    },
    /// Analyze a repository against an assessment
    Analyze {
        /// Assessment ID
        #[arg(long)]
        assessment: String,
        /// Repository URL
        #[arg(long)]
        repo: String,
        /// How the progress line weighs phases
        #[arg(long, value_enum)]
        weighting: Option<Weighting>,
    },
    /// Show stored assessment results
    Results {
        /// Assessment ID
        #[arg(long)]
        assessment: String,
    },
    /// Show items scoring below a threshold
    NotImplemented {
        /// Assessment ID
        #[arg(long)]
        assessment: String,
        /// Score threshold (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: Option<u8>,
    },
    /// Recompute item statuses from their scores
    UpdateStatus {
        /// Assessment ID
        #[arg(long)]
        assessment: String,
        /// Minimum score for "Applied"
        #[arg(long)]
        applied: u8,
        /// Minimum score for "Partially Applied"
        #[arg(long)]
        partial: u8,
    },
    /// Show dashboard figures
    Summary,
}

#[derive(Subcommand)]
enum VendorCommand {
    /// List vendors
    List,
    /// Show vendor details
    Show {
        /// Vendor ID
        id: String,
    },
    /// Create a vendor
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Update a vendor
    Update {
        /// Vendor ID
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Delete a vendor
    Delete {
        /// Vendor ID
        id: String,
    },
}

#[derive(Subcommand)]
enum ProductCommand {
    /// List products
    List {
        /// Only products of this vendor
        #[arg(long)]
        vendor: Option<String>,
    },
    /// Show product details
    Show {
        /// Product ID
        id: String,
    },
    /// Create a product
    Create {
        /// Owning vendor ID
        #[arg(long)]
        vendor: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
    },
    /// Update a product
    Update {
        /// Product ID
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
    },
    /// Delete a product
    Delete {
        /// Product ID
        id: String,
    },
    /// Record stage 1 approval
    Approve {
        /// Product ID
        id: String,
        /// Reviewer comments
        #[arg(long)]
        comments: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Weighting {
    PerPhase,
    ByDuration,
}

impl From<Weighting> for ProgressWeighting {
    fn from(w: Weighting) -> Self {
        match w {
            Weighting::PerPhase => ProgressWeighting::PerPhase,
            Weighting::ByDuration => ProgressWeighting::ByDuration,
        }
    }
}

struct App {
    settings: Settings,
    ctx: ServiceContext,
    notifier: Arc<RecordingNotifier>,
    json: bool,
}

impl App {
    fn new(settings: Settings, json: bool) -> Result<Self> {
        let session = Arc::new(match &settings.token {
            Some(token) => Session::signed_in(settings.user.clone(), token.clone()),
            None => Session::new(),
        });
        let backend = HttpBackend::new(settings.client.clone(), session)
            .context("Failed to create HTTP client")?;
        let notifier = Arc::new(RecordingNotifier::new());
        let ctx = ServiceContext::new(Arc::new(backend), notifier.clone());
        Ok(Self { settings, ctx, notifier, json })
    }

    fn vendors(&self) -> VendorService {
        VendorService::new(self.ctx.clone())
    }

    fn products(&self) -> ProductService {
        ProductService::new(self.ctx.clone())
    }

    fn orchestrator(&self) -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(self.ctx.clone()).with_config(OrchestratorConfig {
            analyze_timeout: self.settings.client.analyze_timeout,
        })
    }

    fn flush_notifications(&self) {
        render::notifications(&self.notifier.take());
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text(value);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.global.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let file = match &cli.global.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let weighting = match &cli.command {
        Commands::Analyze { weighting, .. } => weighting.map(Into::into),
        _ => None,
    };
    let settings = Settings::resolve(
        file,
        Overrides {
            api_url: cli.global.api_url.clone(),
            token: cli.global.token.clone(),
            user: cli.global.user.clone(),
            weighting,
        },
    );
    debug!(base_url = %settings.client.base_url, "resolved settings");

    let app = App::new(settings, cli.global.json)?;
    let result = run(&app, cli.command).await;
    app.flush_notifications();
    result
}

async fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Vendors { command } => run_vendors(app, command).await,
        Commands::Products { command } => run_products(app, command).await,
        Commands::Analyze { assessment, repo, .. } => run_analyze(app, assessment, repo).await,
        Commands::Results { assessment } => {
            let results = app
                .orchestrator()
                .results(&AssessmentId::new(assessment))
                .await?;
            app.emit(&results, |r| {
                println!("Assessment: {} ({} items)", r.assessment_id, r.total_items);
                println!(
                    "  Analyzed: {} | Pending: {} | Average score: {:.1} | Readiness: {}",
                    r.statistics.items_analyzed,
                    r.statistics.items_pending,
                    r.statistics.average_score,
                    r.statistics.implementation_readiness,
                );
                for item in &r.items {
                    let score = item
                        .results
                        .last()
                        .map_or_else(|| "-".to_string(), |s| format!("{:.0}", s.score));
                    println!(
                        "  {} | {} | {} | {}",
                        item.category, item.evaluation_item, item.status, score
                    );
                }
            })
        }
        Commands::NotImplemented { assessment, threshold } => {
            let items = app
                .orchestrator()
                .not_implemented(&AssessmentId::new(assessment), threshold)
                .await?;
            app.emit(&items, |n| {
                println!(
                    "Below {:.0}: {} items",
                    n.score_threshold, n.total_not_implemented
                );
                for summary in &n.summary {
                    println!(
                        "  {} ({} items, average {:.1})",
                        summary.category, summary.count, summary.average_score
                    );
                    for item in n.items_by_category.get(&summary.category).into_iter().flatten() {
                        println!("    {} | {:.0}", item.evaluation_item, item.current_score);
                    }
                }
            })
        }
        Commands::UpdateStatus { assessment, applied, partial } => {
            let outcome = app
                .orchestrator()
                .apply_status_thresholds(&AssessmentId::new(assessment), applied, partial)
                .await?;
            match outcome {
                StatusOutcome::Updated(result) => app.emit(&result, |r| {
                    for update in &r.updates {
                        println!(
                            "  {} | {} -> {} | {:.0}",
                            update.evaluation_item,
                            update.old_status,
                            update.new_status,
                            update.score
                        );
                    }
                }),
                StatusOutcome::Rejected(message) => bail!(message),
                StatusOutcome::Failed(err) => Err(err.into()),
                StatusOutcome::Discarded => Ok(()),
            }
        }
        Commands::Summary => {
            let dashboard = DashboardService::new(app.vendors(), app.products());
            let summary = dashboard.summary().await?;
            app.emit(&summary, render::dashboard)
        }
    }
}

async fn run_vendors(app: &App, command: VendorCommand) -> Result<()> {
    let vendors = app.vendors();
    match command {
        VendorCommand::List => {
            let list = vendors.list().await?;
            app.emit(&list, |list| {
                println!("Vendors ({})", list.len());
                for v in list {
                    println!(
                        "  {} | {} | {} | {} products",
                        v.id, v.name, v.email, v.product_count
                    );
                }
            })
        }
        VendorCommand::Show { id } => {
            let vendor = vendors.get(&VendorId::new(id)).await?;
            app.emit(&vendor, |v| {
                println!("Vendor: {}", v.id);
                println!("  Name: {}", v.name);
                println!("  Email: {}", v.email);
                println!("  Products: {}", v.product_count);
                println!("  Created: {}", v.created_at);
            })
        }
        VendorCommand::Create { name, email } => {
            let created = vendors.create(&CreateVendor { name, email }).await?;
            if let Some(v) = created {
                app.emit(&v, |v| println!("Created vendor: {} - {}", v.id, v.name))?;
            }
            Ok(())
        }
        VendorCommand::Update { id, name, email } => {
            vendors
                .update(&VendorId::new(id), &UpdateVendor { name, email })
                .await?;
            Ok(())
        }
        VendorCommand::Delete { id } => {
            vendors.delete(&VendorId::new(id)).await?;
            Ok(())
        }
    }
}

async fn run_products(app: &App, command: ProductCommand) -> Result<()> {
    let products = app.products();
    match command {
        ProductCommand::List { vendor } => {
            let list = match vendor {
                Some(vendor) => products.by_vendor(&VendorId::new(vendor)).await?,
                None => products.list().await?,
            };
            app.emit(&list, |list| {
                println!("Products ({})", list.len());
                for p in list {
                    let approval = if p.is_approved() { "approved" } else { "pending" };
                    println!("  {} | {} | {} | {}", p.id, p.name, p.vendor_name, approval);
                }
            })
        }
        ProductCommand::Show { id } => {
            let product = products.get(&ProductId::new(id)).await?;
            app.emit(&product, |p| {
                println!("Product: {}", p.id);
                println!("  Name: {}", p.name);
                println!("  Description: {}", p.description);
                println!("  Vendor: {} ({})", p.vendor_name, p.vendor_id);
                println!("  Status: {}", p.status);
                match (&p.stage1_approved_at, &p.stage1_approved_by_name) {
                    (Some(at), Some(by)) => println!("  Approved: {at} by {by}"),
                    (Some(at), None) => println!("  Approved: {at}"),
                    _ => println!("  Approved: no"),
                }
                println!("  Created: {}", p.created_at);
            })
        }
        ProductCommand::Create { vendor, name, description } => {
            let product = CreateProduct {
                name,
                description,
                vendor_id: VendorId::new(vendor),
            };
            if let Some(p) = products.create(&product).await? {
                app.emit(&p, |p| println!("Created product: {} - {}", p.id, p.name))?;
            }
            Ok(())
        }
        ProductCommand::Update { id, name, description } => {
            products
                .update(&ProductId::new(id), &UpdateProduct { name, description })
                .await?;
            Ok(())
        }
        ProductCommand::Delete { id } => {
            products.delete(&ProductId::new(id)).await?;
            Ok(())
        }
        ProductCommand::Approve { id, comments } => {
            products.approve(&ProductId::new(id), comments).await?;
            Ok(())
        }
    }
}

async fn run_analyze(app: &App, assessment: String, repo: String) -> Result<()> {
    let phases = PhaseSequence::analysis();
    let stepper = Arc::new(StepperDriver::new(
        phases.clone(),
        StepperConfig {
            weighting: app.settings.weighting,
            ..StepperConfig::default()
        },
    ));
    let orchestrator = app.orchestrator().with_stepper(Arc::clone(&stepper));

    let renderer = if app.json {
        None
    } else {
        Some(tokio::spawn(render::progress_line(stepper.subscribe(), phases)))
    };
    let outcome = orchestrator
        .run_analysis(&AssessmentId::new(assessment), &repo)
        .await;
    if let Some(renderer) = renderer {
        renderer.abort();
        render::clear_line();
    }

    match outcome? {
        AnalysisOutcome::Completed(result) => app.emit(&result, render::analysis),
        AnalysisOutcome::Reported(result) => {
            app.emit(&result, render::analysis)?;
            bail!("analysis reported failure")
        }
        AnalysisOutcome::Failed(err) => Err(err.into()),
        AnalysisOutcome::Discarded => Ok(()),
    }
}
