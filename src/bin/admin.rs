//! CLI administration tool for the site directory.
//!
//! Provides site management, URL resolution and listing views directly
//! against the database.
//!
//! # Usage
//!
//! ```bash
//! # Create a site with two alias URLs
//! cargo run --bin admin -- sites create --name Blog --url https://blog.example.com \
//!     --alias https://www.blog.example.com --alias http://blog.example.com
//!
//! # Which sites own these URLs (optionally only those alice may access)
//! cargo run --bin admin -- resolve https://www.blog.example.com --login alice
//!
//! # Soft-delete, then purge
//! cargo run --bin admin -- sites delete 12
//! cargo run --bin admin -- sites purge 12
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! See [`site_directory::config`]; `DATABASE_URL` is the usual choice.

use site_directory::AppState;
use site_directory::config;
use site_directory::domain::entities::{NewSite, Site, SitePatch};
use site_directory::domain::repositories::Principal;
use site_directory::error::AppError;
use site_directory::infrastructure::database;
use site_directory::telemetry;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing the site directory.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage sites
    Sites {
        #[command(subcommand)]
        action: SiteAction,
    },

    /// Manage alias URLs of a site
    Aliases {
        #[command(subcommand)]
        action: AliasAction,
    },

    /// Resolve URLs to the ids of the sites owning them
    Resolve {
        /// URLs to resolve (exact match, no normalization)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Only return sites this login may access
        #[arg(short, long)]
        login: Option<String>,

        /// Treat the login as a superuser
        #[arg(long, requires = "login")]
        superuser: bool,
    },

    /// Search sites by name, URL, group or id
    Search {
        pattern: String,

        /// Candidate site ids (comma-separated)
        #[arg(long, value_delimiter = ',', conflicts_with = "login")]
        ids: Vec<i64>,

        /// Search the sites this login may access instead of explicit ids
        #[arg(short, long)]
        login: Option<String>,

        #[arg(long)]
        limit: Option<i64>,
    },

    /// Dump every (site id, url) pair, primary and alias
    KnownUrls,

    /// Sites with visits in the window (from, to]
    Active {
        /// Window start, RFC 3339 (exclusive)
        #[arg(long)]
        from: DateTime<Utc>,

        /// Window end, RFC 3339 (inclusive)
        #[arg(long)]
        to: DateTime<Utc>,
    },

    /// Lower creation dates to a floor for the given sites
    Backfill {
        /// New creation date, RFC 3339
        #[arg(long)]
        floor: DateTime<Utc>,

        #[arg(required = true, value_delimiter = ',')]
        ids: Vec<i64>,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Site management subcommands.
#[derive(Subcommand)]
enum SiteAction {
    /// List sites
    List {
        /// Only sites in this group ("" for ungrouped)
        #[arg(long, conflicts_with = "ids")]
        group: Option<String>,

        /// Only these site ids (comma-separated)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<i64>,

        #[arg(long, requires = "ids")]
        limit: Option<i64>,
    },

    /// Show one site
    Show { id: i64 },

    /// Create a site
    Create {
        #[arg(short, long)]
        name: String,

        /// Primary URL
        #[arg(short, long)]
        url: String,

        /// Alias URL (repeatable)
        #[arg(short, long)]
        alias: Vec<String>,

        #[arg(short, long)]
        group: Option<String>,

        #[arg(long)]
        timezone: Option<String>,

        #[arg(long = "type")]
        site_type: Option<String>,
    },

    /// Update fields of a site
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long, conflicts_with = "clear_group")]
        group: Option<String>,

        #[arg(long)]
        clear_group: bool,

        #[arg(long)]
        timezone: Option<String>,

        #[arg(long = "type")]
        site_type: Option<String>,
    },

    /// Soft-delete a site
    Delete { id: i64 },

    /// Permanently remove a soft-deleted site, its aliases and access grants
    Purge {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Primary and alias URLs of a site
    Urls { id: i64 },

    /// Distinct groups
    Groups,

    /// Distinct timezones
    Timezones,

    /// Distinct site types
    Types,

    /// Ids of sites in any of the given timezones
    InTimezones {
        #[arg(required = true)]
        timezones: Vec<String>,
    },
}

/// Alias URL subcommands.
#[derive(Subcommand)]
enum AliasAction {
    List { site_id: i64 },
    Add { site_id: i64, url: String },
    /// Replace all aliases of a site
    Set { site_id: i64, urls: Vec<String> },
    Clear { site_id: i64 },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database and configuration info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    telemetry::init(&config);

    let pool = database::connect(&config).await?;
    if config.auto_migrate {
        database::migrate(&pool).await?;
    }

    let state = AppState::new(Arc::new(pool.clone()));

    let result = match cli.command {
        Commands::Sites { action } => handle_site_action(action, &state).await,
        Commands::Aliases { action } => handle_alias_action(action, &state).await,
        Commands::Resolve {
            urls,
            login,
            superuser,
        } => resolve(&state, urls, login, superuser).await,
        Commands::Search {
            pattern,
            ids,
            login,
            limit,
        } => search(&state, pattern, ids, login, limit).await,
        Commands::KnownUrls => known_urls(&state).await,
        Commands::Active { from, to } => active_sites(&state, from, to).await,
        Commands::Backfill { floor, ids } => backfill(&state, floor, ids).await,
        Commands::Db { action } => return handle_db_action(action, &pool, &config).await,
    };

    if let Err(e) = result {
        let info = e.info();
        eprintln!("{} {}", format!("[{}]", info.code).red().bold(), info.message);
        if !info.details.is_null() && info.details != serde_json::json!({}) {
            eprintln!("  {}", info.details.to_string().bright_black());
        }
        return Err(e.into());
    }

    Ok(())
}

/// Dispatches site management commands.
async fn handle_site_action(action: SiteAction, state: &AppState) -> Result<(), AppError> {
    let sites = &state.site_service;
    let directory = &state.directory_service;

    match action {
        SiteAction::List { group, ids, limit } => {
            let list = match group {
                Some(group) => directory.sites_in_group(&group).await?,
                None if !ids.is_empty() => sites.list_sites_by_ids(&ids, limit).await?,
                None => sites.list_sites().await?,
            };
            print_sites(&list);
        }
        SiteAction::Show { id } => {
            let site = sites.get_site(id).await?;
            print_site_details(&site);
        }
        SiteAction::Create {
            name,
            url,
            alias,
            group,
            timezone,
            site_type,
        } => {
            let mut new_site = NewSite::new(name, url);
            if let Some(group) = group {
                new_site = new_site.with_group(group);
            }
            if let Some(timezone) = timezone {
                new_site = new_site.with_timezone(timezone);
            }
            if let Some(site_type) = site_type {
                new_site = new_site.with_type(site_type);
            }

            let id = sites.create_site(new_site, alias).await?;
            println!(
                "{} {}",
                "Site created with id".green().bold(),
                id.to_string().bright_white().bold()
            );
        }
        SiteAction::Update {
            id,
            name,
            url,
            group,
            clear_group,
            timezone,
            site_type,
        } => {
            let group = if clear_group { Some(None) } else { group.map(Some) };
            let patch = SitePatch {
                name,
                main_url: url,
                group,
                timezone,
                site_type,
            };

            let site = sites.update_site(id, patch).await?;
            println!("{}", "Site updated".green().bold());
            print_site_details(&site);
        }
        SiteAction::Delete { id } => {
            sites.soft_delete_site(id).await?;
            println!(
                "{} {}",
                "Site soft-deleted:".green().bold(),
                id.to_string().bright_white()
            );
        }
        SiteAction::Purge { id, yes } => {
            if !yes && !confirm(&format!("Permanently purge site {id}?"))? {
                println!("{}", "Cancelled".red());
                return Ok(());
            }

            sites.purge_site(id).await?;
            println!(
                "{} {}",
                "Site purged:".green().bold(),
                id.to_string().bright_white()
            );
        }
        SiteAction::Urls { id } => {
            for url in sites.site_urls(id).await? {
                println!("  {}", url.cyan());
            }
        }
        SiteAction::Groups => {
            for group in directory.groups().await? {
                if group.is_empty() {
                    println!("  {}", "(no group)".bright_black());
                } else {
                    println!("  {}", group.cyan());
                }
            }
        }
        SiteAction::Timezones => print_strings(&directory.timezones().await?),
        SiteAction::Types => print_strings(&directory.site_types().await?),
        SiteAction::InTimezones { timezones } => {
            print_ids(&directory.site_ids_in_timezones(&timezones).await?)
        }
    }

    Ok(())
}

/// Dispatches alias URL commands.
async fn handle_alias_action(action: AliasAction, state: &AppState) -> Result<(), AppError> {
    let sites = &state.site_service;

    match action {
        AliasAction::List { site_id } => print_strings(&sites.list_aliases(site_id).await?),
        AliasAction::Add { site_id, url } => {
            sites.add_alias(site_id, &url).await?;
            println!("{}", "Alias added".green().bold());
        }
        AliasAction::Set { site_id, urls } => {
            sites.replace_aliases(site_id, urls).await?;
            println!("{}", "Aliases replaced".green().bold());
        }
        AliasAction::Clear { site_id } => {
            let removed = sites.clear_aliases(site_id).await?;
            println!(
                "{} {}",
                "Aliases removed:".green().bold(),
                removed.to_string().bright_white()
            );
        }
    }

    Ok(())
}

async fn resolve(
    state: &AppState,
    urls: Vec<String>,
    login: Option<String>,
    superuser: bool,
) -> Result<(), AppError> {
    let ids = match login {
        Some(login) => {
            let principal = if superuser {
                Principal::superuser(login)
            } else {
                Principal::user(login)
            };
            state.url_resolver.resolve_scoped(&principal, &urls).await?
        }
        None => state.url_resolver.resolve_unscoped(&urls).await?,
    };

    print_ids(&ids);
    Ok(())
}

async fn search(
    state: &AppState,
    pattern: String,
    ids: Vec<i64>,
    login: Option<String>,
    limit: Option<i64>,
) -> Result<(), AppError> {
    let found = match login {
        Some(login) => {
            state
                .search_service
                .search_for_principal(&Principal::user(login), &pattern, limit)
                .await?
        }
        None => state.search_service.search(ids, &pattern, limit).await?,
    };

    print_sites(&found);
    Ok(())
}

async fn known_urls(state: &AppState) -> Result<(), AppError> {
    for known in state.url_resolver.list_all_known_urls().await? {
        println!("{}\t{}", known.site_id, known.url);
    }
    Ok(())
}

async fn active_sites(
    state: &AppState,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<(), AppError> {
    let ids = state.directory_service.site_ids_with_visits(from, to).await?;
    print_ids(&ids);
    Ok(())
}

async fn backfill(state: &AppState, floor: DateTime<Utc>, ids: Vec<i64>) -> Result<(), AppError> {
    let changed = state
        .directory_service
        .backfill_created_at(&ids, floor)
        .await?;

    println!(
        "{} {}",
        "Sites updated:".green().bold(),
        changed.to_string().bright_white().bold()
    );
    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool, config: &config::Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            config.print_summary();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let sites: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sites WHERE deleted = FALSE")
                .fetch_one(pool)
                .await?;
            let deleted: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sites WHERE deleted = TRUE")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL:    {}", version.bright_white());
            println!("  Sites:         {}", sites.to_string().bright_green().bold());
            println!("  Soft-deleted:  {}", deleted.to_string().yellow());
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool, AppError> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| {
            AppError::invalid_argument(
                "Confirmation prompt failed",
                serde_json::json!({ "reason": e.to_string() }),
            )
        })
}

/// Prints sites as a table.
///
/// ```text
///   ID    Name                     Main URL                           Group
///   1     Blog                     https://blog.example.com           news
/// ```
fn print_sites(sites: &[Site]) {
    if sites.is_empty() {
        println!("{}", "  No sites found".yellow());
        return;
    }

    println!(
        "  {:<5} {:<24} {:<34} {}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Main URL".bright_white().bold(),
        "Group".bright_white().bold()
    );
    println!("  {}", "-".repeat(75).bright_black());

    for site in sites {
        println!(
            "  {:<5} {:<24} {:<34} {}",
            site.id.to_string().bright_black(),
            site.name.cyan(),
            site.main_url,
            site.group_label().bright_black()
        );
    }

    println!();
    println!("  Total: {}", sites.len().to_string().bright_white().bold());
}

fn print_site_details(site: &Site) {
    println!("  ID:        {}", site.id.to_string().bright_white().bold());
    println!("  Name:      {}", site.name.cyan());
    println!("  Main URL:  {}", site.main_url);
    println!("  Group:     {}", site.group_label());
    println!("  Timezone:  {}", site.timezone);
    println!("  Type:      {}", site.site_type);
    println!(
        "  Created:   {}",
        site.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
}

fn print_ids(ids: &[i64]) {
    if ids.is_empty() {
        println!("{}", "  No sites".yellow());
        return;
    }
    let joined: Vec<String> = ids.iter().map(i64::to_string).collect();
    println!("{}", joined.join(","));
}

fn print_strings(values: &[String]) {
    for value in values {
        println!("  {}", value.cyan());
    }
}
