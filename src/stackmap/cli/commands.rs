//! # CLI Layer
//!
//! One possible client of the catalog. This is the only place that knows
//! about stdout, stderr, files named on the command line and exit codes.
//!
//! - `run()`: parse, build the context, dispatch, flush pending writes
//! - `handle_*()`: resolve names to ids, call `CatalogApi`, print
//!
//! Apps and functions are addressed by id or by exact name.

use super::print::{
    print_app_list, print_function_groups, print_import_report, print_pairs, print_usage,
};
use super::setup::{Cli, Commands};
use clap::Parser;
use colored::Colorize;
use directories::ProjectDirs;
use stackmap::api::CatalogApi;
use stackmap::config::CatalogConfig;
use stackmap::error::{Result, StackError};
use stackmap::model::PairKind;
use stackmap::query;
use stackmap::store::fs_backend::FsBackend;
use std::fs;
use std::path::{Path, PathBuf};

const HOME_ENV: &str = "STACKMAP_HOME";
const DATA_SUBDIR: &str = "data";

struct AppContext {
    api: CatalogApi<FsBackend>,
    verbose: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut ctx = init_context(&cli)?;

    let result = match cli.command {
        Some(Commands::Apps) | None => handle_apps(&ctx),
        Some(Commands::Functions { unused }) => handle_functions(&ctx, unused),
        Some(Commands::AddApp { name }) => handle_add_app(&mut ctx, &name),
        Some(Commands::Assign { app, function }) => handle_assign(&mut ctx, &app, &function),
        Some(Commands::Cycle { app, function }) => handle_cycle(&mut ctx, &app, &function),
        Some(Commands::Pair {
            a,
            b,
            direct,
            zapier,
        }) => handle_pair(&mut ctx, &a, &b, direct, zapier),
        Some(Commands::Pairs { app }) => handle_pairs(&ctx, &app),
        Some(Commands::Usage) => handle_usage(&mut ctx),
        Some(Commands::Export { file }) => handle_export(&ctx, file.as_deref()),
        Some(Commands::Import { file }) => handle_import(&mut ctx, &file),
        Some(Commands::Reset) => handle_reset(&mut ctx),
    };

    // Coalesced text edits must reach disk before the process exits.
    ctx.api.flush();
    result
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let home = resolve_home(cli.home.clone())?;
    let config = CatalogConfig::load(&home)?;
    let backend = FsBackend::new(home.join(DATA_SUBDIR));
    tracing::debug!(home = %home.display(), "opening catalog");

    Ok(AppContext {
        api: CatalogApi::open(backend, config),
        verbose: cli.verbose,
    })
}

fn resolve_home(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(home) = flag {
        return Ok(home);
    }
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "stackmap", "stackmap")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| StackError::Config("could not determine data directory".into()))
}

fn resolve_app_id(ctx: &AppContext, id_or_name: &str) -> Result<String> {
    query::find_app(ctx.api.state(), id_or_name)
        .map(|app| app.id.clone())
        .ok_or_else(|| StackError::NotFound(format!("app '{}'", id_or_name)))
}

fn handle_apps(ctx: &AppContext) -> Result<()> {
    print_app_list(ctx.api.state(), ctx.verbose);
    Ok(())
}

fn handle_functions(ctx: &AppContext, unused: bool) -> Result<()> {
    let groups: Vec<_> = ctx
        .api
        .functions_with_apps()
        .into_iter()
        .filter(|group| !unused || group.assignments.is_empty())
        .collect();
    print_function_groups(&groups);
    Ok(())
}

fn handle_add_app(ctx: &mut AppContext, name: &str) -> Result<()> {
    let app = ctx.api.create_app();
    ctx.api.rename_app(&app.id, name);
    println!("{} {}", "Added".green(), name.bold());
    if ctx.verbose {
        println!("{}", app.id.dimmed());
    }
    Ok(())
}

fn handle_assign(ctx: &mut AppContext, app: &str, function: &str) -> Result<()> {
    let app_id = resolve_app_id(ctx, app)?;
    let existing = query::find_function(ctx.api.state(), function).map(|f| f.id.clone());
    let function_id = match existing {
        Some(id) => id,
        None => ctx
            .api
            .get_or_create_function_by_name(function)
            .map(|created| created.id)
            .ok_or_else(|| StackError::NotFound("function name is blank".into()))?,
    };

    if ctx.api.assign_function(&app_id, &function_id) {
        println!("{} {} → {}", "Assigned".green(), function.bold(), app);
    } else {
        println!("{}", format!("{} already fills {}", app, function).yellow());
    }
    Ok(())
}

fn handle_cycle(ctx: &mut AppContext, app: &str, function: &str) -> Result<()> {
    let app_id = resolve_app_id(ctx, app)?;
    let function_id = query::find_function(ctx.api.state(), function)
        .map(|f| f.id.clone())
        .ok_or_else(|| StackError::NotFound(format!("function '{}'", function)))?;

    let level = ctx
        .api
        .cycle_assignment_level(&app_id, &function_id)
        .ok_or_else(|| StackError::NotFound(format!("{} is not assigned to {}", function, app)))?;
    println!("{} / {} is now {}", app, function, level.label().bold());
    Ok(())
}

fn handle_pair(
    ctx: &mut AppContext,
    a: &str,
    b: &str,
    direct: Option<String>,
    zapier: Option<String>,
) -> Result<()> {
    let a_id = resolve_app_id(ctx, a)?;
    let b_id = resolve_app_id(ctx, b)?;
    let pair = ctx
        .api
        .get_or_create_pair(&a_id, &b_id)
        .ok_or_else(|| StackError::NotFound("an app cannot integrate with itself".into()))?;

    if let Some(note) = direct {
        ctx.api.set_pair_flag(&pair.id, PairKind::Direct, &note);
    }
    if let Some(note) = zapier {
        ctx.api.set_pair_flag(&pair.id, PairKind::Zapier, &note);
    }

    match ctx.api.state().pair(&pair.id) {
        Some(pair) => print_pairs(ctx.api.state(), &a_id, &[pair]),
        None => println!("{}", "No integration recorded.".dimmed()),
    }
    Ok(())
}

fn handle_pairs(ctx: &AppContext, app: &str) -> Result<()> {
    let app_id = resolve_app_id(ctx, app)?;
    let pairs = ctx.api.pairs_for_app(&app_id);
    print_pairs(ctx.api.state(), &app_id, &pairs);
    Ok(())
}

fn handle_usage(ctx: &mut AppContext) -> Result<()> {
    ctx.api.rebuild_indexes();
    print_usage(ctx.api.state(), ctx.api.refs());
    Ok(())
}

fn handle_export(ctx: &AppContext, file: Option<&Path>) -> Result<()> {
    let document = ctx.api.export_document()?;
    match file {
        Some(path) => {
            fs::write(path, document)?;
            println!("{} {}", "Exported to".green(), path.display());
        }
        None => println!("{}", document),
    }
    Ok(())
}

fn handle_import(ctx: &mut AppContext, file: &Path) -> Result<()> {
    let text = fs::read_to_string(file)?;
    let report = ctx.api.import_document(&text)?;
    print_import_report(&report, ctx.verbose);
    Ok(())
}

fn handle_reset(ctx: &mut AppContext) -> Result<()> {
    ctx.api.reset();
    println!("{}", "Catalog reset to sample data.".green());
    Ok(())
}
