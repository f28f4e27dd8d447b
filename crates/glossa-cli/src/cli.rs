use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use glossa_sdk::{BranchId, DiffFingerprint, KeyIdentity, KeyResolution, Resolution, SpaceId};

#[derive(Parser)]
#[command(
    name = "glossa",
    about = "Glossa: branch, diff and merge translation content",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database file.
    #[arg(long, global = true, default_value = "glossa.db")]
    pub db: PathBuf,

    /// Acting user for access checks.
    #[arg(long, global = true, default_value = "cli")]
    pub user: String,

    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create or list spaces
    #[command(subcommand)]
    Space(SpaceCommand),
    /// List, create, delete, rename branches or change the default
    #[command(subcommand)]
    Branch(BranchCommand),
    /// Set or list translation keys on a branch
    #[command(subcommand)]
    Key(KeyCommand),
    /// Show what a source branch has that a target branch does not
    Diff(DiffArgs),
    /// Merge a source branch into a target branch
    Merge(MergeArgs),
    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(Subcommand)]
pub enum SpaceCommand {
    /// Create a space together with its default branch
    Create {
        name: String,
        #[arg(long)]
        project: String,
        #[arg(long)]
        default_branch: Option<String>,
    },
    /// List the spaces of a project
    List {
        #[arg(long)]
        project: String,
    },
}

#[derive(Subcommand)]
pub enum BranchCommand {
    /// List the branches of a space
    List { space: SpaceId },
    /// Fork a branch
    Create {
        space: SpaceId,
        name: String,
        #[arg(long)]
        from: BranchId,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Delete a branch
    Delete { branch: BranchId },
    /// Make a branch the default of its space
    Default { branch: BranchId },
    /// Rename a branch; the slug is kept
    Rename { branch: BranchId, name: String },
    /// Show a branch and the branches it was forked from
    Lineage { branch: BranchId },
}

#[derive(Subcommand)]
pub enum KeyCommand {
    /// Set one translation, creating the key if needed
    Set {
        branch: BranchId,
        /// `namespace:name` or `name`
        key: KeyIdentity,
        language: String,
        value: String,
    },
    /// List keys with their translations
    List { branch: BranchId },
}

#[derive(Args)]
pub struct DiffArgs {
    pub source: BranchId,
    pub target: BranchId,
    /// Show word-level hints for modified values.
    #[arg(long)]
    pub inline: bool,
}

#[derive(Args)]
pub struct MergeArgs {
    pub source: BranchId,
    pub target: BranchId,
    /// Settle a conflict: `namespace:name=source` or `name=target`.
    #[arg(long = "resolve", value_parser = parse_resolution)]
    pub resolutions: Vec<KeyResolution>,
    /// Refuse to merge unless the diff still has this fingerprint.
    #[arg(long = "expect")]
    pub expected_fingerprint: Option<DiffFingerprint>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML server configuration. `--db` is used when absent.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<String>,
}

pub fn parse_resolution(raw: &str) -> Result<KeyResolution, String> {
    let (key, choice) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected KEY=source|target, got {raw:?}"))?;
    let key: KeyIdentity = key.parse().map_err(|e| format!("{e}"))?;
    let resolution = match choice.trim() {
        "source" => Resolution::UseSource,
        "target" => Resolution::UseTarget,
        other => return Err(format!("unknown resolution {other:?}, use source or target")),
    };
    Ok(KeyResolution::new(key, resolution))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRANCH: &str = "01928c3e-6c1f-7a2b-9d4e-5f6a7b8c9d0e";
    const OTHER: &str = "01928c3e-6c1f-7a2b-9d4e-5f6a7b8c9d0f";

    #[test]
    fn parse_space_create() {
        let cli = Cli::try_parse_from(["glossa", "space", "create", "Web", "--project", "acme"])
            .unwrap();
        if let Command::Space(SpaceCommand::Create {
            name,
            project,
            default_branch,
        }) = cli.command
        {
            assert_eq!(name, "Web");
            assert_eq!(project, "acme");
            assert!(default_branch.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_branch_create() {
        let cli = Cli::try_parse_from([
            "glossa", "branch", "create", BRANCH, "feature", "--from", OTHER,
        ])
        .unwrap();
        if let Command::Branch(BranchCommand::Create { name, from, slug, .. }) = cli.command {
            assert_eq!(name, "feature");
            assert_eq!(from.to_string(), OTHER);
            assert!(slug.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_branch_id_rejects_garbage() {
        assert!(Cli::try_parse_from(["glossa", "branch", "delete", "not-a-uuid"]).is_err());
    }

    #[test]
    fn parse_key_set_with_namespace() {
        let cli = Cli::try_parse_from([
            "glossa", "key", "set", BRANCH, "checkout:title", "en", "Checkout",
        ])
        .unwrap();
        if let Command::Key(KeyCommand::Set { key, language, value, .. }) = cli.command {
            assert_eq!(key.namespace(), Some("checkout"));
            assert_eq!(key.name(), "title");
            assert_eq!(language, "en");
            assert_eq!(value, "Checkout");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_merge_resolutions() {
        let cli = Cli::try_parse_from([
            "glossa",
            "merge",
            BRANCH,
            OTHER,
            "--resolve",
            "checkout:title=source",
            "--resolve",
            "greeting=target",
        ])
        .unwrap();
        if let Command::Merge(args) = cli.command {
            assert_eq!(args.resolutions.len(), 2);
            assert_eq!(args.resolutions[0].key.to_string(), "checkout:title");
            assert_eq!(args.resolutions[0].resolution, Resolution::UseSource);
            assert_eq!(args.resolutions[1].resolution, Resolution::UseTarget);
            assert!(args.expected_fingerprint.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_merge_expect() {
        let fingerprint = "ab".repeat(32);
        let cli = Cli::try_parse_from(["glossa", "merge", BRANCH, OTHER, "--expect", fingerprint.as_str()])
            .unwrap();
        if let Command::Merge(args) = cli.command {
            assert_eq!(args.expected_fingerprint.unwrap().to_hex(), fingerprint);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn resolution_for_bare_name_with_colon() {
        let parsed = parse_resolution(":errors:404=target").unwrap();
        assert_eq!(parsed.key.namespace(), None);
        assert_eq!(parsed.key.name(), "errors:404");
        assert_eq!(parsed.key.to_string(), ":errors:404");
        assert_eq!(parsed.resolution, Resolution::UseTarget);
    }

    #[test]
    fn bad_resolution_is_rejected() {
        assert!(parse_resolution("greeting").is_err());
        assert!(parse_resolution("greeting=mine").is_err());
        assert!(parse_resolution("=source").is_err());
    }

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["glossa", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind.as_deref(), Some("0.0.0.0:8080"));
            assert!(args.config.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_globals() {
        let cli = Cli::try_parse_from([
            "glossa", "-vv", "--format", "json", "--db", "/tmp/x.db", "diff", BRANCH, OTHER,
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.db, PathBuf::from("/tmp/x.db"));
    }
}
