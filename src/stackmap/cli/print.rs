use colored::{ColoredString, Colorize};
use stackmap::commands::transfer::ImportReport;
use stackmap::model::{App, Icon, IntegrationPair, Level, PairColor};
use stackmap::query::{self, FunctionGroup};
use stackmap::refs::{RefIndex, RefLocation};
use stackmap::state::CatalogState;

pub(super) fn print_app_list(state: &CatalogState, verbose: bool) {
    if state.apps.is_empty() {
        println!("No apps found.");
        return;
    }

    for app in &state.apps {
        let marker = app_marker(app);
        let name = query::app_display_name(app).bold();
        if verbose {
            println!("[{}] {} {}", marker, name, app.id.dimmed());
        } else {
            println!("[{}] {}", marker, name);
        }
        for assigned in query::assignments_for_app(state, &app.id) {
            println!(
                "    {} {}",
                query::function_display_name(&assigned.function),
                level_tag(assigned.level)
            );
        }
    }
}

pub(super) fn print_function_groups(groups: &[FunctionGroup<'_>]) {
    if groups.is_empty() {
        println!("No functions found.");
        return;
    }

    for group in groups {
        println!(
            "{} {}",
            query::function_display_name(&group.function).bold(),
            group.function.category.dimmed()
        );
        if group.assignments.is_empty() {
            println!("    {}", "(no apps)".dimmed());
        }
        for entry in &group.assignments {
            println!(
                "    {} {}",
                query::app_display_name(entry.app),
                level_tag(entry.level)
            );
        }
    }
}

pub(super) fn print_pairs(state: &CatalogState, app_id: &str, pairs: &[&IntegrationPair]) {
    if pairs.is_empty() {
        println!("No integrations recorded.");
        return;
    }

    for pair in pairs {
        let other = pair
            .other(app_id)
            .and_then(|id| state.app(id))
            .map(query::app_display_name)
            .unwrap_or("(missing app)");
        println!("{} {}", color_tag(query::pair_color(pair)), other.bold());
        for note in &pair.direct_notes {
            println!("    direct: {}", note);
        }
        for note in &pair.zapier_notes {
            println!("    zapier: {}", note);
        }
        for action in pair.a_to_b.actions.iter().chain(pair.b_to_a.actions.iter()) {
            println!("    {} {}", "•".dimmed(), action.label);
        }
    }
}

pub(super) fn print_usage(state: &CatalogState, refs: &RefIndex) {
    println!("{}", "Resources".bold());
    if refs.resources.is_empty() {
        println!("    {}", "(none cited)".dimmed());
    }
    for (key, locations) in &refs.resources {
        println!("  {} ({})", key, locations.len());
        for location in locations {
            println!("    {}", describe(state, location).dimmed());
        }
    }

    println!("{}", "Merge fields".bold());
    if refs.tokens.is_empty() {
        println!("    {}", "(none used)".dimmed());
    }
    for (token, locations) in &refs.tokens {
        println!("  {{{{{}}}}} ({})", token, locations.len());
        for location in locations {
            println!("    {}", describe(state, location).dimmed());
        }
    }

    for key in refs.dangling_resources(state) {
        println!("{}", format!("Missing target: {}", key).yellow());
    }
    for token in refs.unknown_tokens(state) {
        println!("{}", format!("Unknown datapoint: {}", token).yellow());
    }
}

pub(super) fn print_import_report(report: &ImportReport, verbose: bool) {
    println!(
        "{} {} collection(s)",
        "Imported".green(),
        report.replaced_fields
    );
    if verbose && !report.migration.is_noop() {
        println!("{}", format!("{:?}", report.migration).dimmed());
    }
}

fn app_marker(app: &App) -> String {
    match (&app.icon, app.avatar()) {
        (_, Some(avatar)) => avatar.letter.to_string(),
        (Icon::Emoji { value }, None) => value.clone(),
        _ => "*".to_string(),
    }
}

fn level_tag(level: Level) -> ColoredString {
    let tag = format!("[{}]", level.label());
    match level {
        Level::Primary => tag.green(),
        Level::Available => tag.normal(),
        Level::Evaluating => tag.yellow(),
    }
}

fn color_tag(color: PairColor) -> ColoredString {
    match color {
        PairColor::Direct => "direct".blue(),
        PairColor::Zapier => "zapier".yellow(),
        PairColor::Both => "both  ".magenta(),
        PairColor::None => "none  ".dimmed(),
    }
}

fn describe(state: &CatalogState, location: &RefLocation) -> String {
    match location {
        RefLocation::Step {
            workflow_id,
            step_id,
        } => {
            let workflow = state.workflows.iter().find(|w| &w.id == workflow_id);
            let step = workflow.and_then(|w| w.steps.iter().find(|s| &s.id == step_id));
            format!(
                "workflow {} / step {}",
                workflow.map(|w| w.name.as_str()).unwrap_or(workflow_id.as_str()),
                step.map(|s| s.title.as_str()).unwrap_or(step_id.as_str())
            )
        }
        RefLocation::NamingTemplate { template_id } => format!("naming template {}", template_id),
        RefLocation::FolderTemplate { template_id } => format!("folder template {}", template_id),
        RefLocation::AppMapping { app_id } => format!(
            "app {}",
            state
                .app(app_id)
                .map(query::app_display_name)
                .unwrap_or(app_id.as_str())
        ),
    }
}
