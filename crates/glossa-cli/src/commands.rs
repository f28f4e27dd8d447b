use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use glossa_sdk::{
    inline_changes, Branch, BranchDiff, Glossa, InlineChange, InlineTag, KeyEntry, MergeRequest,
    MergeResult, ProjectId, SqliteStore, StoreConfig, TracingEventSink, UserId,
};
use glossa_server::{GlossaServer, ServerConfig};
use serde::Serialize;
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        db,
        user,
        format,
        ..
    } = cli;
    let user = UserId::new(user);
    match command {
        Command::Space(cmd) => cmd_space(&open(&db)?, &user, format, cmd),
        Command::Branch(cmd) => cmd_branch(&open(&db)?, &user, format, cmd),
        Command::Key(cmd) => cmd_key(&open(&db)?, &user, format, cmd),
        Command::Diff(args) => cmd_diff(&open(&db)?, &user, format, args),
        Command::Merge(args) => cmd_merge(&open(&db)?, &user, format, args),
        Command::Serve(args) => cmd_serve(db, args),
    }
}

fn open(db: &Path) -> anyhow::Result<Glossa> {
    let store = SqliteStore::open(StoreConfig::at_path(db))
        .with_context(|| format!("opening {}", db.display()))?;
    Ok(Glossa::builder(Arc::new(store))
        .events(Arc::new(TracingEventSink))
        .build())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_branch(branch: &Branch) {
    let marker = if branch.is_default { "*".green().bold() } else { " ".normal() };
    let from = branch
        .source_branch_id
        .map(|id| format!(" (from {})", id.short_id()).dimmed().to_string())
        .unwrap_or_default();
    println!(
        "{} {}  {}  {}{}",
        marker,
        branch.slug.yellow(),
        branch.name,
        branch.id.to_string().dimmed(),
        from
    );
}

fn cmd_space(
    glossa: &Glossa,
    user: &UserId,
    format: OutputFormat,
    cmd: SpaceCommand,
) -> anyhow::Result<()> {
    match cmd {
        SpaceCommand::Create {
            name,
            project,
            default_branch,
        } => {
            let project = ProjectId::new(project);
            let (space, branch) =
                glossa.create_space(user, &project, &name, default_branch.as_deref())?;
            match format {
                OutputFormat::Json => print_json(&json!({ "space": space, "defaultBranch": branch })),
                OutputFormat::Text => {
                    println!("{} Created space {} ({})", "✓".green().bold(), space.name.bold(), space.id);
                    print_branch(&branch);
                    Ok(())
                }
            }
        }
        SpaceCommand::List { project } => {
            let spaces = glossa.spaces(user, &ProjectId::new(project))?;
            match format {
                OutputFormat::Json => print_json(&spaces),
                OutputFormat::Text => {
                    if spaces.is_empty() {
                        println!("No spaces.");
                    }
                    for space in &spaces {
                        println!("{}  {}", space.name.bold(), space.id.to_string().dimmed());
                    }
                    Ok(())
                }
            }
        }
    }
}

fn cmd_branch(
    glossa: &Glossa,
    user: &UserId,
    format: OutputFormat,
    cmd: BranchCommand,
) -> anyhow::Result<()> {
    let shown = match cmd {
        BranchCommand::List { space } => glossa.branches(user, space)?,
        BranchCommand::Create {
            space,
            name,
            from,
            slug,
        } => {
            let mut request = glossa_sdk::CreateBranch::fork(space, from, name);
            if let Some(slug) = slug {
                request = request.with_slug(slug);
            }
            let branch = glossa.create_branch(user, request)?;
            if format == OutputFormat::Text {
                println!("{} Created branch {}", "✓".green().bold(), branch.slug.yellow());
            }
            vec![branch]
        }
        BranchCommand::Delete { branch } => {
            glossa.delete_branch(user, branch)?;
            match format {
                OutputFormat::Json => print_json(&json!({ "deleted": branch }))?,
                OutputFormat::Text => println!("Deleted branch {}", branch.to_string().yellow()),
            }
            return Ok(());
        }
        BranchCommand::Default { branch } => {
            let branch = glossa.set_default_branch(user, branch)?;
            if format == OutputFormat::Text {
                println!("Default branch is now {}", branch.slug.yellow().bold());
            }
            vec![branch]
        }
        BranchCommand::Rename { branch, name } => {
            let branch = glossa.rename_branch(user, branch, &name)?;
            if format == OutputFormat::Text {
                println!("Renamed {} to {}", branch.slug.yellow(), branch.name.bold());
            }
            vec![branch]
        }
        BranchCommand::Lineage { branch } => glossa.lineage(user, branch)?,
    };

    match format {
        OutputFormat::Json => print_json(&shown),
        OutputFormat::Text => {
            for branch in &shown {
                print_branch(branch);
            }
            Ok(())
        }
    }
}

fn cmd_key(
    glossa: &Glossa,
    user: &UserId,
    format: OutputFormat,
    cmd: KeyCommand,
) -> anyhow::Result<()> {
    match cmd {
        KeyCommand::Set {
            branch,
            key,
            language,
            value,
        } => {
            let record = glossa.set_translation(user, branch, &key, &language, &value)?;
            match format {
                OutputFormat::Json => print_json(&record),
                OutputFormat::Text => {
                    println!("{} {} [{}] = {:?}", "✓".green(), key.to_string().bold(), language.cyan(), value);
                    Ok(())
                }
            }
        }
        KeyCommand::List { branch } => {
            let keys = glossa.keys(user, branch)?;
            match format {
                OutputFormat::Json => print_json(&keys),
                OutputFormat::Text => {
                    if keys.is_empty() {
                        println!("No keys.");
                    }
                    keys.iter().for_each(print_key);
                    Ok(())
                }
            }
        }
    }
}

fn print_key(entry: &KeyEntry) {
    println!("{}", entry.identity.to_string().bold());
    if let Some(description) = &entry.description {
        println!("  {}", description.dimmed());
    }
    for (language, value) in &entry.values {
        println!("  {} {:?}", format!("{language}:").cyan(), value);
    }
}

fn cmd_diff(
    glossa: &Glossa,
    user: &UserId,
    format: OutputFormat,
    args: DiffArgs,
) -> anyhow::Result<()> {
    let diff = glossa.diff(user, args.source, args.target)?;
    match format {
        OutputFormat::Json => print_json(&json!({
            "added": diff.added,
            "modified": diff.modified,
            "deleted": diff.deleted,
            "fingerprint": diff.fingerprint(),
            "stats": diff.stats(),
        })),
        OutputFormat::Text => {
            print_diff(&diff, args.inline);
            Ok(())
        }
    }
}

fn print_diff(diff: &BranchDiff, inline: bool) {
    if diff.is_empty() {
        println!("No changes.");
        return;
    }
    for added in &diff.added {
        println!("{} {}", "+".green().bold(), added.identity.to_string().green());
        for (language, value) in &added.values {
            println!("    {} {:?}", format!("{language}:").cyan(), value);
        }
    }
    for modified in &diff.modified {
        println!("{} {}", "~".yellow().bold(), modified.identity.to_string().yellow());
        for (language, change) in &modified.languages {
            println!("    {}", format!("{language}:").cyan());
            match (&change.target_value, &change.source_value) {
                (Some(target), Some(source)) if inline => {
                    println!("      {}", render_inline(&inline_changes(source, target)));
                }
                (target, source) => {
                    if let Some(target) = target {
                        println!("      {} {:?}", "-".red(), target);
                    }
                    if let Some(source) = source {
                        println!("      {} {:?}", "+".green(), source);
                    }
                }
            }
        }
    }
    for deleted in &diff.deleted {
        println!("{} {}", "-".red().bold(), deleted.identity.to_string().red());
    }

    let stats = diff.stats();
    println!(
        "\n{} added, {} modified, {} deleted  {}",
        stats.added.to_string().green(),
        stats.modified.to_string().yellow(),
        stats.deleted.to_string().red(),
        format!("fingerprint {}", diff.fingerprint()).dimmed(),
    );
}

fn render_inline(changes: &[InlineChange]) -> String {
    changes
        .iter()
        .map(|change| match change.tag {
            InlineTag::Equal => change.text.normal().to_string(),
            InlineTag::Insert => change.text.green().underline().to_string(),
            InlineTag::Delete => change.text.red().strikethrough().to_string(),
        })
        .collect()
}

fn cmd_merge(
    glossa: &Glossa,
    user: &UserId,
    format: OutputFormat,
    args: MergeArgs,
) -> anyhow::Result<()> {
    let request = MergeRequest {
        resolutions: args.resolutions,
        expected_fingerprint: args.expected_fingerprint,
    };
    let result = glossa.merge(user, args.source, args.target, &request)?;

    match (&result, format) {
        (MergeResult::Applied(summary), OutputFormat::Json) => print_json(&json!({
            "success": true,
            "appliedCount": summary.applied_count,
            "added": summary.added,
            "updated": summary.updated,
        })),
        (MergeResult::Applied(summary), OutputFormat::Text) => {
            println!(
                "{} Merged {} keys ({} added, {} updated)",
                "✓".green().bold(),
                summary.applied_count.to_string().bold(),
                summary.added,
                summary.updated
            );
            Ok(())
        }
        (MergeResult::Conflicted(conflicts), OutputFormat::Json) => {
            print_json(&json!({ "success": false, "conflicts": conflicts }))?;
            anyhow::bail!("{} unresolved conflicts", conflicts.len())
        }
        (MergeResult::Conflicted(conflicts), OutputFormat::Text) => {
            println!("{} Nothing merged. Unresolved conflicts:", "✗".red().bold());
            for conflict in conflicts {
                let languages: Vec<&str> = conflict.languages.keys().map(String::as_str).collect();
                println!("  {} [{}]", conflict.identity.to_string().yellow(), languages.join(", "));
            }
            println!("Re-run with --resolve KEY=source|target for each key.");
            anyhow::bail!("{} unresolved conflicts", conflicts.len())
        }
    }
}

fn cmd_serve(db: PathBuf, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig {
            store: StoreConfig::at_path(db),
            ..ServerConfig::default()
        },
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind:?}"))?;
    }

    let server = GlossaServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_rendering_keeps_text() {
        colored::control::set_override(false);
        let rendered = render_inline(&inline_changes("Hello big world", "Hello world"));
        assert_eq!(rendered, "Hello big world");
    }

    #[test]
    fn commands_round_trip_through_a_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("glossa.db");
        let user = UserId::new("cli");

        let glossa = open(&db).unwrap();
        let (space, main) = glossa
            .create_space(&user, &ProjectId::new("acme"), "Web", None)
            .unwrap();
        drop(glossa);

        let reopened = open(&db).unwrap();
        let branches = reopened.branches(&user, space.id).unwrap();
        assert_eq!(branches, vec![main]);
    }
}
