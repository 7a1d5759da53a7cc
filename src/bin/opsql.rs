//! opsql — compile operation-node trees from the command line
//!
//! Trees are read as JSON, one `Query` object per file.
//!
//! # Usage
//!
//! ```bash
//! # Compile a tree
//! opsql compile query.json
//!
//! # Read from stdin, print JSON
//! cat query.json | opsql compile - --format json
//!
//! # Show the tree outline and the statement
//! opsql explain query.json
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use opsql::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "opsql")]
#[command(version)]
#[command(about = "Compile operation-node query trees to SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    opsql compile query.json
    opsql compile - --format json < query.json
    opsql explain query.json --config opsql.toml")]
struct Cli {
    /// Compiler config file (defaults to ./opsql.toml, then the user config dir)
    #[arg(short, long, global = true, env = "OPSQL_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON query tree
    Compile {
        /// Path to the tree, or `-` for stdin
        input: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Print the tree outline, then the compiled statement
    Explain {
        /// Path to the tree, or `-` for stdin
        input: String,
    },
    /// Show the modifier and join keyword tables
    Keywords,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "opsql=debug" } else { "opsql=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Compile { input, format } => {
            let query = read_tree(input)?;
            let compiled = compiler(cli)?.compile(&query)?;
            print_compiled(&compiled, *format)
        }
        Commands::Explain { input } => {
            let query = read_tree(input)?;
            explain(&query, &compiler(cli)?)
        }
        Commands::Keywords => {
            show_keywords();
            Ok(())
        }
    }
}

fn compiler(cli: &Cli) -> Result<QueryCompiler<CompilerConfig>> {
    let config = match &cli.config {
        Some(path) => CompilerConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => CompilerConfig::discover()?,
    };
    Ok(QueryCompiler::with_dialect(config))
}

fn read_tree(input: &str) -> Result<QueryNode> {
    let content = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read file '{}'", input))?
    };

    serde_json::from_str(&content).with_context(|| format!("Invalid query tree in '{}'", input))
}

fn print_compiled(compiled: &CompiledQuery, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(compiled)?);
        }
        OutputFormat::Text => {
            println!("{}", compiled.sql().white());
            if !compiled.bindings().is_empty() {
                println!();
                println!("{}", "Bindings:".cyan());
                for (i, value) in compiled.bindings().iter().enumerate() {
                    println!(
                        "  [{}] {} {}",
                        i,
                        value.to_string().yellow(),
                        value.type_name().dimmed()
                    );
                }
            }
        }
    }
    Ok(())
}

fn explain(query: &QueryNode, compiler: &QueryCompiler<CompilerConfig>) -> Result<()> {
    println!("{}", "Tree:".green().bold());
    let mut lines = Vec::new();
    outline_query(query, 1, &mut lines);
    for line in lines {
        println!("{}", line);
    }

    println!();
    println!("{}", "Compiled:".green().bold());
    let compiled = compiler.compile(query)?;
    println!("  {}", compiled.sql().white());
    for (i, value) in compiled.bindings().iter().enumerate() {
        println!(
            "  {} = {}",
            compiler.dialect().placeholder(i).cyan(),
            value.to_string().yellow()
        );
    }
    Ok(())
}

fn outline_query(query: &QueryNode, indent: usize, lines: &mut Vec<String>) {
    let pad = "  ".repeat(indent);
    lines.push(format!("{}{}", pad, "Query".cyan()));
    if let Some(select) = &query.select {
        outline_node(&Node::Select(select.clone()), indent + 1, lines);
    }
    for from in &query.from {
        lines.push(format!("{}  {}", pad, "from".dimmed()));
        outline_node(from, indent + 2, lines);
    }
    for join in &query.joins {
        outline_node(&Node::Join(join.clone()), indent + 1, lines);
    }
    if let Some(filter) = &query.where_clause {
        lines.push(format!("{}  {}", pad, "where".dimmed()));
        outline_node(filter, indent + 2, lines);
    }
    if let Some(modifier) = query.modifier {
        lines.push(format!("{}  {} {}", pad, "modifier".dimmed(), modifier.as_sql()));
    }
}

fn outline_node(node: &Node, indent: usize, lines: &mut Vec<String>) {
    let pad = "  ".repeat(indent);
    let kind = node.kind().cyan();
    match node {
        Node::Identifier(n) => lines.push(format!("{}{} {}", pad, kind, n.identifier.white())),
        Node::Table(n) => {
            let name = match &n.schema {
                Some(schema) => format!("{}.{}", schema.identifier, n.table.identifier),
                None => n.table.identifier.clone(),
            };
            lines.push(format!("{}{} {}", pad, kind, name.white()));
        }
        Node::Operator(n) => lines.push(format!("{}{} {}", pad, kind, n.operator.yellow())),
        Node::Value(n) => lines.push(format!("{}{} {}", pad, kind, n.value.to_string().yellow())),
        Node::PrimitiveValueList(n) => {
            let values: Vec<String> = n.values.iter().map(|v| v.to_string()).collect();
            lines.push(format!("{}{} ({})", pad, kind, values.join(", ").yellow()));
        }
        Node::SelectAll => lines.push(format!("{}{}", pad, kind)),
        Node::Query(q) => outline_query(q, indent, lines),
        Node::Reference(n) => {
            lines.push(format!("{}{}", pad, kind));
            outline_node(&n.table, indent + 1, lines);
            outline_node(&n.column, indent + 1, lines);
        }
        Node::Alias(n) => {
            lines.push(format!("{}{} {}", pad, kind, n.alias.identifier.white()));
            outline_node(&n.node, indent + 1, lines);
        }
        Node::Selection(n) => outline_node(&n.selection, indent, lines),
        Node::Select(n) => {
            let label = match n.modifier {
                Some(modifier) => format!("{} {}", kind, modifier.as_sql()),
                None => kind.to_string(),
            };
            lines.push(format!("{}{}", pad, label));
            for item in &n.distinct_on_selections {
                lines.push(format!("{}  {}", pad, "distinct on".dimmed()));
                outline_node(item, indent + 2, lines);
            }
            for item in &n.selections {
                outline_node(item, indent + 1, lines);
            }
        }
        Node::Filter(n) => {
            lines.push(format!("{}{}", pad, kind));
            if let Some(lhs) = &n.lhs {
                outline_node(lhs, indent + 1, lines);
            }
            outline_node(&n.op, indent + 1, lines);
            outline_node(&n.rhs, indent + 1, lines);
        }
        Node::And(n) | Node::Or(n) => {
            lines.push(format!("{}{}", pad, kind));
            outline_node(&n.lhs, indent + 1, lines);
            outline_node(&n.rhs, indent + 1, lines);
        }
        Node::Parens(n) => {
            lines.push(format!("{}{}", pad, kind));
            outline_node(&n.node, indent + 1, lines);
        }
        Node::ValueList(n) => {
            lines.push(format!("{}{}", pad, kind));
            for value in &n.values {
                outline_node(value, indent + 1, lines);
            }
        }
        Node::Join(n) => {
            lines.push(format!("{}{} {}", pad, kind, n.join_type.as_sql().white()));
            outline_node(&n.table, indent + 1, lines);
            if let Some(on) = &n.on {
                lines.push(format!("{}  {}", pad, "on".dimmed()));
                outline_node(on, indent + 2, lines);
            }
        }
        Node::Raw(n) => {
            lines.push(format!("{}{} {:?}", pad, kind, n.sql_fragments.join("?")));
            for param in &n.params {
                outline_node(param, indent + 1, lines);
            }
        }
    }
}

fn show_keywords() {
    println!("{}", "Query modifiers".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for modifier in QueryModifier::ALL {
        println!("{:20} {}", format!("{:?}", modifier).yellow(), modifier.as_sql());
    }

    println!();
    println!("{}", "Join types".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for join_type in JoinType::ALL {
        println!("{:20} {}", format!("{:?}", join_type).yellow(), join_type.as_sql());
    }
}
