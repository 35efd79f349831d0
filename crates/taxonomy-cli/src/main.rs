use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use taxonomy_core::config::Config;
use taxonomy_core::{
    build_taxonomy_tree, parse_nodes, read_taxonomy_text, to_pretty_json, write_json, Forest,
    OutputFormat, Result, TaxonomyError, TaxonomyTree,
};

mod args;
use args::{Cli, Commands, ConfigAction, InputArgs, ParseFormat, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let base_dir = resolve_base_dir(cli.base_dir);

    let result = match cli.command {
        Some(Commands::Check { input }) => handle_check(&base_dir, &input),
        Some(Commands::Parse { input, format }) => handle_parse(&base_dir, &input, format),
        Some(Commands::Tree {
            input,
            root,
            format,
            output,
        }) => handle_tree(
            &base_dir,
            &input,
            root.as_deref(),
            format,
            output.as_deref(),
        ),
        Some(Commands::Relation {
            input,
            ancestor,
            descendant,
        }) => handle_relation(&base_dir, &input, &ancestor, &descendant),
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// `RUST_LOG` wins; otherwise the level follows --verbose / --quiet
fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "taxonomy", &mut io::stdout());
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = std::env::var("TAXONOMY_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".taxonomy"))
        .unwrap_or_else(|| PathBuf::from(".taxonomy"))
}

fn load_text(input: &InputArgs, config: &Config) -> Result<String> {
    if input.text {
        return Ok(input.input.clone());
    }
    let path = Path::new(&input.input);
    debug!(path = %path.display(), key = %config.taxonomy.json_key, "reading taxonomy");
    read_taxonomy_text(path, &config.taxonomy.json_key)
}

fn load_forest(input: &InputArgs, config: &Config) -> Result<Forest> {
    let text = load_text(input, config)?;
    let forest = parse_nodes(&text)?;
    debug!(
        roots = forest.len(),
        nodes = forest.node_count(),
        "parsed taxonomy"
    );
    Ok(forest)
}

fn handle_check(base_dir: &Path, input: &InputArgs) -> Result<()> {
    let config = Config::load(base_dir)?;
    let forest = load_forest(input, &config)?;

    println!(
        "{} {} roots, {} nodes, depth {}",
        "Valid:".green(),
        forest.len(),
        forest.node_count(),
        forest.depth()
    );
    Ok(())
}

fn handle_parse(base_dir: &Path, input: &InputArgs, format: ParseFormat) -> Result<()> {
    let config = Config::load(base_dir)?;
    let forest = load_forest(input, &config)?;

    match format {
        ParseFormat::Notation => println!("{}", forest),
        ParseFormat::Json => println!("{}", to_pretty_json(&forest.to_json()?)?),
    }
    Ok(())
}

fn handle_tree(
    base_dir: &Path,
    input: &InputArgs,
    root: Option<&str>,
    format: Option<OutputFormat>,
    output: Option<&Path>,
) -> Result<()> {
    let config = Config::load(base_dir)?;
    let forest = load_forest(input, &config)?;
    let root = root.unwrap_or(&config.taxonomy.root_label);
    let tree = build_taxonomy_tree(&forest, root);

    if let Some(path) = output {
        write_json(path, &tree.to_json()?)?;
        info!(path = %path.display(), nodes = tree.size(), "wrote taxonomy tree");
        println!("{} {}", "Written:".green(), path.display());
        return Ok(());
    }

    match format.unwrap_or(config.output.format) {
        OutputFormat::Tree => print!("{}", tree),
        OutputFormat::Json => println!("{}", to_pretty_json(&tree.to_json()?)?),
        OutputFormat::Notation => println!("{}", forest),
    }
    Ok(())
}

fn handle_relation(
    base_dir: &Path,
    input: &InputArgs,
    ancestor: &str,
    descendant: &str,
) -> Result<()> {
    let config = Config::load(base_dir)?;
    let forest = load_forest(input, &config)?;
    let tree = build_taxonomy_tree(&forest, &config.taxonomy.root_label);

    require_node(&tree, ancestor)?;
    require_node(&tree, descendant)?;

    if tree.is_ancestor(ancestor, descendant) {
        println!(
            "{} is an ancestor of {}",
            ancestor.cyan(),
            descendant.cyan()
        );
    } else {
        println!(
            "{} is {} an ancestor of {}",
            ancestor.cyan(),
            "not".yellow(),
            descendant.cyan()
        );
    }

    println!("Path: {}", format_path(&tree, descendant));
    Ok(())
}

/// `Taxonomy > Animal > Bird` for `Bird`; just the label for the root
fn format_path(tree: &TaxonomyTree, name: &str) -> String {
    let mut path: Vec<_> = tree.ancestors(name).into_iter().rev().collect();
    path.push(name);
    path.join(" > ")
}

fn require_node(tree: &TaxonomyTree, name: &str) -> Result<()> {
    if tree.contains(name) {
        Ok(())
    } else {
        Err(TaxonomyError::NodeNotFound {
            name: name.to_string(),
        })
    }
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            let value = config
                .get(&key)
                .ok_or(TaxonomyError::ConfigKeyNotFound { key })?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(base_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}
