//! Sift CLI
//!
//! Parse a document, print its tree or the elements a selector picks out.

mod view;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser as _;
use sift_common::warning::warn_once;
use sift_html::Parser;
use sift_select::{collect, compile_selector};

use crate::view::{MatchView, NodeView, Report, TreePrinter, render_errors};

/// Command-line arguments.
#[derive(clap::Parser, Debug)]
#[command(name = "sift")]
#[command(author, version, about = "Parse HTML or XML and query it with CSS selectors", long_about = None)]
#[command(after_help = r#"EXAMPLES:
    sift page.html                              Print the parsed tree
    sift page.html -s 'a[href^=http]'           Print matching elements
    sift --html '<p>Hi<b>there' --errors 10     Show recovered parse errors
    sift feed.xml --xml -s 'item > title' --json  Matches as JSON
"#)]
struct Cli {
    /// HTML or XML file to parse
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this markup instead of a file
    #[arg(long, value_name = "MARKUP")]
    html: Option<String>,

    /// Use the XML parser
    #[arg(long)]
    xml: bool,

    /// Print only the elements matching this selector
    #[arg(short, long, value_name = "QUERY")]
    select: Option<String>,

    /// Record up to N parse errors and print them
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    errors: usize,

    /// Also report each recorded error as a warning on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Base URI for resolving relative links
    #[arg(long, value_name = "URI", default_value = "")]
    base_uri: String,

    /// Print JSON instead of the colored tree
    #[arg(long)]
    json: bool,
}

fn read_input(cli: &Cli) -> Result<String> {
    match (&cli.html, &cli.path) {
        (Some(markup), path) => {
            if let Some(path) = path {
                warn_once(
                    "CLI",
                    &format!("--html given, ignoring {}", path.display()),
                );
            }
            Ok(markup.clone())
        }
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        (None, None) => bail!("no input: pass a FILE or --html MARKUP"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let input = read_input(&cli)?;

    // STEP 1: Compile the selector before parsing so a bad query fails fast.
    let evaluator = cli
        .select
        .as_deref()
        .map(|query| compile_selector(query).with_context(|| format!("invalid selector '{query}'")))
        .transpose()?;

    // STEP 2: Parse.
    let mut parser = (if cli.xml { Parser::xml() } else { Parser::html() }).with_verbose_errors(cli.verbose);
    let _ = parser.set_track_errors(cli.errors);
    let tree = parser.parse_input(&input, &cli.base_uri);
    let matches = evaluator.map(|evaluator| collect(&evaluator, &tree, tree.root()));

    if let (Some(query), Some(found)) = (&cli.select, &matches)
        && found.is_empty()
    {
        warn_once("CLI", &format!("no elements match '{query}'"));
    }

    let errors = parser.is_track_errors().then(|| parser.errors().as_slice());

    // STEP 3: Report.
    if cli.json {
        let report = Report {
            quirks_mode: tree.quirks_mode(),
            tree: matches.is_none().then(|| NodeView::build(&tree, tree.root())).flatten(),
            matches: matches.as_ref().map(|found| {
                found.iter().map(|&id| MatchView::build(&tree, id)).collect()
            }),
            errors,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &matches {
        Some(found) => {
            for &id in found {
                println!("{}", tree.outer_html(id));
            }
        }
        None => print!("{}", TreePrinter::render(&tree, tree.root())),
    }
    if let Some(errors) = errors {
        eprint!("{}", render_errors(errors));
    }

    Ok(())
}
