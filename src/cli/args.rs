use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config YAML file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging for internal details
    #[arg(short, long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the compiled rewrite rules and their fingerprint
    Rules(RulesArgs),
    /// Print the base slugs for the site locale
    Bases(BasesArgs),
    /// Print the localized matcher table
    Matchers,
    /// Resolve a URL into query variables
    Resolve(ResolveArgs),
    /// Print the canonical link for an archive view
    Link(LinkArgs),
    /// Validate every rule without serving
    Check,
    /// Run the HTTP dispatcher (default)
    Serve,
}

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Print the table as JSON rows instead of `regex => query` lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct BasesArgs {
    /// Print the alternatives instead of the regex form
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// URL or path to resolve, e.g. /events/list/page/2/
    pub url: String,
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// View to link to (list, month, day, ...)
    #[arg(long)]
    pub display: Option<String>,

    /// Date for month (YYYY-MM) or day (YYYY-MM-DD) views
    #[arg(long)]
    pub date: Option<String>,

    /// Link to the featured events only
    #[arg(long)]
    pub featured: bool,

    /// Category slug; repeat for a multi-category link
    #[arg(long)]
    pub category: Vec<String>,

    /// Page number
    #[arg(long)]
    pub page: Option<u32>,
}
