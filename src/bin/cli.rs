use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use dotenvy::dotenv;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use feedbackhub::cli::{SeedOptions, SeedOutcome, render_tree, seed_defaults, validate_file};
use feedbackhub::logging::init_cli_tracing;
use feedbackhub::modules::departments::service::DepartmentService;
use feedbackhub::modules::hierarchy::{HierarchyService, HierarchySource, SaveReport};
use feedbackhub::state::init_store;
use feedbackhub_config::{HierarchyPolicy, StoreBackend};
use feedbackhub_db::HierarchyStore;
use feedbackhub_models::InstitutionId;

#[derive(Parser)]
#[command(name = "feedbackhub-cli")]
#[command(about = "Feedbackhub CLI - Administrative tools for academic hierarchies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save the built-in default hierarchy for an institution
    SeedDefaults {
        /// Institution ID
        #[arg(short = 'i', long)]
        institution: InstitutionId,

        /// Register the institution under this name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Institution code selecting the default (engineering, management, pharmacy)
        #[arg(short = 'c', long)]
        code: Option<String>,

        /// Overwrite an existing hierarchy without asking
        #[arg(long)]
        force: bool,
    },
    /// Print an institution's hierarchy
    Show {
        /// Institution ID
        #[arg(short = 'i', long)]
        institution: InstitutionId,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create directory records for departments missing from the last save
    SyncDepartments {
        /// Institution ID
        #[arg(short = 'i', long)]
        institution: InstitutionId,
    },
    /// Check a hierarchy JSON file against the naming rules
    Validate {
        /// Path to a JSON file holding `{"courses": [...]}`
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_cli_tracing();

    let cli = Cli::parse();
    let policy = HierarchyPolicy::from_env();

    if let Commands::Validate { file } = &cli.command {
        handle_validate(&policy, file);
        return;
    }

    let store = match connect().await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::SeedDefaults {
            institution,
            name,
            code,
            force,
        } => {
            let options = SeedOptions {
                institution_id: institution,
                name,
                code,
            };
            handle_seed_defaults(&store, &policy, options, force).await
        }
        Commands::Show { institution, json } => {
            handle_show(&store, &policy, institution, json).await
        }
        Commands::SyncDepartments { institution } => {
            handle_sync_departments(&store, &policy, institution).await
        }
        Commands::Validate { .. } => {}
    }
}

async fn connect() -> anyhow::Result<Arc<dyn HierarchyStore>> {
    let backend = StoreBackend::from_env()?;
    if backend == StoreBackend::Memory {
        eprintln!("⚠️  STORE_BACKEND=memory: changes made by this command are not kept");
    }
    init_store(&backend).await
}

fn print_report(report: &SaveReport) {
    println!("   Courses: {}", report.course_count);
    if !report.departments_created.is_empty() {
        println!(
            "   Departments created: {}",
            report.departments_created.join(", ")
        );
    }
    for failure in &report.departments_failed {
        println!("   ⚠️  Department '{}' not created: {}", failure.name, failure.error);
    }
    if report.departments_skipped {
        println!("   ⚠️  Department directory unavailable; run sync-departments later");
    }
}

async fn handle_seed_defaults(
    store: &Arc<dyn HierarchyStore>,
    policy: &HierarchyPolicy,
    options: SeedOptions,
    force: bool,
) {
    let institution_id = options.institution_id;
    let retry = SeedOptions {
        institution_id,
        name: None,
        code: options.code.clone(),
    };

    let mut outcome = seed_defaults(store, policy, options, force).await;

    if let Ok(SeedOutcome::AlreadyConfigured) = outcome {
        let overwrite = Confirm::new()
            .with_prompt("This institution already has a hierarchy. Overwrite it with the default?")
            .default(false)
            .interact()
            .unwrap_or(false);

        if !overwrite {
            println!("Nothing changed.");
            return;
        }
        outcome = seed_defaults(store, policy, retry, true).await;
    }

    match outcome {
        Ok(SeedOutcome::Saved { default, report }) => {
            println!("\n✅ Saved the '{}' default hierarchy for {}", default, institution_id);
            print_report(&report);
        }
        Ok(SeedOutcome::AlreadyConfigured) => println!("Nothing changed."),
        Err(e) => {
            eprintln!("\n❌ Error seeding hierarchy: {:#}", e);
            process::exit(1);
        }
    }
}

async fn handle_show(
    store: &Arc<dyn HierarchyStore>,
    policy: &HierarchyPolicy,
    institution_id: InstitutionId,
    json: bool,
) {
    let loaded = match HierarchyService::load(store.as_ref(), policy, institution_id).await {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("❌ Error loading hierarchy: {}", e.error);
            process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&loaded.tree) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("❌ Error encoding hierarchy: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    match &loaded.source {
        HierarchySource::Stored { updated_at } => match updated_at {
            Some(at) => println!("# Saved hierarchy (updated {})", at),
            None => println!("# Saved hierarchy"),
        },
        HierarchySource::Default { name } => {
            println!("# Not saved yet; showing the '{}' default", name)
        }
    }
    print!("{}", render_tree(&loaded.tree));
}

async fn handle_sync_departments(
    store: &Arc<dyn HierarchyStore>,
    policy: &HierarchyPolicy,
    institution_id: InstitutionId,
) {
    match DepartmentService::resync(store, policy, institution_id).await {
        Ok(sync) if sync.skipped => {
            eprintln!("❌ Department directory unavailable");
            process::exit(1);
        }
        Ok(sync) => {
            if sync.created.is_empty() && sync.failed.is_empty() {
                println!("✅ Department directory already up to date");
            } else if !sync.created.is_empty() {
                println!("✅ Created: {}", sync.created.join(", "));
            }
            for failure in &sync.failed {
                println!("⚠️  '{}' not created: {}", failure.name, failure.error);
            }
        }
        Err(e) => {
            eprintln!("❌ Error syncing departments: {}", e.error);
            process::exit(1);
        }
    }
}

fn handle_validate(policy: &HierarchyPolicy, file: &Path) {
    match validate_file(policy, file) {
        Ok(violations) if violations.is_empty() => println!("✅ {} is valid", file.display()),
        Ok(violations) => {
            for violation in &violations {
                println!("❌ {}: {}", violation.path, violation.message);
            }
            eprintln!("\n{} problem(s) found", violations.len());
            process::exit(1);
        }
        Err(e) => {
            eprintln!("❌ {:#}", e);
            process::exit(1);
        }
    }
}
