//! kuro CLI - local-first version control command line interface

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kuro::ops::{
    add, bundle, checkout, commit, create_branch, delete_branch, fsck, list_branches, log, status,
    unstage, CheckoutOptions, CheckoutOutcome, CommitOutcome,
};
use kuro::{remote, set_remote, Error, IoResultExt, Repo, Settings};

#[derive(Parser)]
#[command(name = "kuro")]
#[command(about = "local-first version control")]
#[command(version)]
struct Cli {
    /// repository path (searched upward for .kuro)
    #[arg(short, long, default_value = ".")]
    repo: PathBuf,

    /// user settings file (default: ~/.kuro/config.toml)
    #[arg(long, env = "KURO_CONFIG")]
    config: Option<PathBuf>,

    /// more log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a new repository
    Init {
        /// path to create repository at
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// stage a file or directory for the next commit
    Add {
        /// path to stage
        path: PathBuf,
    },

    /// take a file or directory off the stage
    Remove {
        /// path to unstage
        path: PathBuf,
    },

    /// record staged files as a new commit
    Commit {
        /// commit message
        #[arg(short, long)]
        message: String,
    },

    /// show the current branch and commit
    Status {
        /// also list staged files
        #[arg(short, long)]
        stage: bool,
    },

    /// show commit history, newest first
    Log {
        /// branch to show (default: current)
        #[arg(short, long)]
        branch: Option<String>,

        /// maximum number of commits to show
        #[arg(short = 'n', long)]
        max_count: Option<usize>,
    },

    /// list, create or delete branches
    Branch {
        #[command(subcommand)]
        command: Option<BranchCommand>,
    },

    /// switch branches or reset the working tree
    Checkout {
        /// branch name or commit hash (default: current branch)
        #[arg(default_value = "")]
        target: String,

        /// make the working tree match the target
        #[arg(long)]
        ws: bool,
    },

    /// show or set the push destination
    Remote {
        #[command(subcommand)]
        command: Option<RemoteCommand>,
    },

    /// verify repository integrity
    Fsck,

    /// write the current branch's commit as a JSON bundle
    Bundle {
        /// output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// show or change user settings
    Config {
        /// author name recorded on commits
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum BranchCommand {
    /// list branches
    List,
    /// create a branch at the current commit
    Create { name: String },
    /// delete a branch
    Delete { name: String },
}

#[derive(Subcommand)]
enum RemoteCommand {
    /// set the remote as <user>/<repo> or a URL ending with it
    Add { spec: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("KURO_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> kuro::Result<()> {
    let settings_path = cli.config.clone().or_else(Settings::default_path);

    match cli.command {
        Commands::Init { path } => match Repo::init(&path) {
            Ok(_) => println!("initialized kuro repository at {}", path.display()),
            Err(e) if e.is_already_exists() => println!("{}", e),
            Err(e) => return Err(e),
        },

        Commands::Add { path } => {
            let mut repo = Repo::discover(&cli.repo)?;
            let report = add(&mut repo, &absolute(&path)?)?;
            for path in &report.staged {
                println!("staged {}", path);
            }
            for path in &report.ignored {
                println!("ignored {}", path);
            }
            println!("{} staged, {} ignored", report.staged.len(), report.ignored.len());
        }

        Commands::Remove { path } => {
            let mut repo = Repo::discover(&cli.repo)?;
            let removed = unstage(&mut repo, &absolute(&path)?)?;
            if removed.is_empty() {
                println!("nothing staged under {}", path.display());
            }
            for path in removed {
                println!("unstaged {}", path);
            }
        }

        Commands::Commit { message } => {
            let mut repo = Repo::discover(&cli.repo)?;
            let settings = match &settings_path {
                Some(path) => Settings::load(path)?,
                None => Settings::default(),
            };
            match commit(&mut repo, &message, settings.name.as_deref())? {
                CommitOutcome::Committed { hash, files } => {
                    println!("committed {} ({} files)", hash, files)
                }
                CommitOutcome::NothingStaged => println!("nothing staged"),
                CommitOutcome::NoChanges => println!("no changes detected"),
            }
        }

        Commands::Status { stage } => {
            let repo = Repo::discover(&cli.repo)?;
            let status = status(&repo)?;
            println!("On branch {}", status.branch);
            match status.snapshot {
                Some(hash) => println!("Commit: {}", hash),
                None => println!("No commits yet"),
            }
            if stage {
                println!("\nstaged files:");
                if status.staged.is_empty() {
                    println!("  (none)");
                }
                for file in &status.staged {
                    println!("  {}", file.path);
                }
                println!("total: {}", status.staged.len());
            }
        }

        Commands::Log { branch, max_count } => {
            let repo = Repo::discover(&cli.repo)?;
            let history = log(&repo, branch.as_deref(), max_count)?;
            if history.entries.is_empty() && history.complete {
                println!("No commits yet on {}", history.branch);
            }
            for entry in &history.entries {
                println!("{}", entry);
            }
            if !history.complete {
                println!("warning: commit history is incomplete");
            }
        }

        Commands::Branch { command } => {
            let mut repo = Repo::discover(&cli.repo)?;
            match command.unwrap_or(BranchCommand::List) {
                BranchCommand::List => {
                    for branch in list_branches(&repo)? {
                        let marker = if branch.current { "*" } else { " " };
                        let tip = branch
                            .snapshot
                            .map(|h| h.short())
                            .unwrap_or_else(|| "(no commits)".to_string());
                        println!("{} {} {}", marker, branch.name, tip);
                    }
                }
                BranchCommand::Create { name } => match create_branch(&mut repo, &name) {
                    Ok(_) => println!("created branch {}", name),
                    Err(e) if e.is_already_exists() => println!("{}", e),
                    Err(e) => return Err(e),
                },
                BranchCommand::Delete { name } => {
                    delete_branch(&mut repo, &name)?;
                    println!("deleted branch {}", name);
                }
            }
        }

        Commands::Checkout { target, ws } => {
            let mut repo = Repo::discover(&cli.repo)?;
            let opts = CheckoutOptions {
                reset_workspace: ws,
            };
            match checkout(&mut repo, &target, opts)? {
                CheckoutOutcome::Current { branch } => println!("already on {}", branch),
                CheckoutOutcome::Switched { to, .. } => println!("switched to branch {}", to),
                CheckoutOutcome::WorkspaceReset {
                    branch,
                    snapshot,
                    stats,
                } => {
                    match branch {
                        Some(name) => println!("reset working tree to {} ({})", name, snapshot),
                        None => println!("reset working tree to {} (detached)", snapshot),
                    }
                    println!(
                        "{} written, {} removed, {} empty directories pruned",
                        stats.written, stats.removed, stats.pruned_dirs
                    );
                }
                CheckoutOutcome::NoCommits { branch } => {
                    println!("no commits yet on {}, working tree left as is", branch)
                }
            }
        }

        Commands::Remote { command } => {
            let repo = Repo::discover(&cli.repo)?;
            match command {
                Some(RemoteCommand::Add { spec }) => match set_remote(repo.db(), &spec) {
                    Ok(remote) => println!("remote set to {}", remote),
                    Err(e) if e.is_already_exists() => println!("{}", e),
                    Err(e) => return Err(e),
                },
                None => match remote(repo.db()) {
                    Ok(remote) => println!("{}", remote),
                    Err(Error::DataNotFound(_)) => println!("no remote configured"),
                    Err(e) => return Err(e),
                },
            }
        }

        Commands::Fsck => {
            let repo = Repo::discover(&cli.repo)?;
            let report = fsck(&repo)?;
            println!("objects checked: {}", report.objects_checked);
            if !report.corrupt_objects.is_empty() {
                println!("\ncorrupt objects:");
                for hash in &report.corrupt_objects {
                    println!("  {}", hash);
                }
            }
            if !report.missing_objects.is_empty() {
                println!("\nmissing objects:");
                for missing in &report.missing_objects {
                    println!(
                        "  {} (referenced by {} at {})",
                        missing.object, missing.snapshot, missing.path
                    );
                }
            }
            if !report.missing_parents.is_empty() {
                println!("\nmissing parents:");
                for missing in &report.missing_parents {
                    println!("  {} (parent of {})", missing.parent, missing.snapshot);
                }
            }
            if !report.dangling_refs.is_empty() {
                println!("\ndangling refs:");
                for (name, hash) in &report.dangling_refs {
                    println!("  {} -> {}", name, hash);
                }
            }
            if let Some(problem) = &report.head_error {
                println!("\nhead: {}", problem);
            }
            if report.is_ok() {
                println!("\nrepository is healthy");
            } else {
                println!("\nrepository has issues");
                return Err(Error::IntegrityCheck);
            }
        }

        Commands::Bundle { output } => {
            let repo = Repo::discover(&cli.repo)?;
            let json = bundle(&repo)?.to_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json).with_path(&path)?;
                    println!("wrote bundle to {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Config { name } => {
            let Some(path) = settings_path else {
                return Err(Error::InvalidPath(
                    "no settings file: set --config or HOME".to_string(),
                ));
            };
            let mut settings = Settings::load(&path)?;
            if let Some(name) = name {
                settings.name = Some(name);
                settings.save(&path)?;
            }
            match &settings.name {
                Some(name) => println!("name = {}", name),
                None => println!("name is not set"),
            }
        }
    }

    Ok(())
}

fn absolute(path: &Path) -> kuro::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().with_path(path)?;
    Ok(cwd.join(path))
}
