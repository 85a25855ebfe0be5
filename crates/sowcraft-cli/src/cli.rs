use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for the `sowcraft` binary.
#[derive(Debug, Parser)]
#[command(
    name = "sowcraft",
    version,
    about = "Turn AI-written SOW narratives into priced documents and workbooks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Policy file (TOML) with pricing rules and an optional rate card
    #[arg(long, global = true, env = "SOWCRAFT_POLICY")]
    pub policy: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert a raw AI response into a document with an enforced pricing table
    Convert(ConvertArgs),
    /// Re-enforce the pricing table of a stored document JSON
    Reprice(RepriceArgs),
    /// Build the formula-linked xlsx workbook from a response's structured scope
    Workbook(WorkbookArgs),
    /// List the rate card
    Roles(RolesArgs),
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Raw response file, or `-` for stdin
    pub input: PathBuf,

    /// Write the document JSON here
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write an HTML rendering here
    #[arg(long)]
    pub html: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RepriceArgs {
    /// Document JSON file, or `-` for stdin
    pub input: PathBuf,

    /// Write the repriced document JSON here
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write an HTML rendering here
    #[arg(long)]
    pub html: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct WorkbookArgs {
    /// Raw response file, or `-` for stdin
    pub input: PathBuf,

    /// Output xlsx path
    #[arg(short, long)]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct RolesArgs {
    /// Only roles whose name contains this term
    #[arg(short, long)]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_policy_parses_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sowcraft", "convert", "in.md", "--json", "out.json", "--policy", "p.toml",
        ])
        .expect("cli should parse");

        assert_eq!(cli.policy.as_deref(), Some(std::path::Path::new("p.toml")));
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.input, std::path::PathBuf::from("in.md"));
        assert_eq!(args.json, Some("out.json".into()));
        assert!(args.html.is_none());
    }

    #[test]
    fn workbook_requires_out() {
        assert!(Cli::try_parse_from(["sowcraft", "workbook", "in.md"]).is_err());
        let cli = Cli::try_parse_from(["sowcraft", "workbook", "in.md", "-o", "sow.xlsx"])
            .expect("cli should parse");
        assert!(matches!(cli.command, Commands::Workbook(_)));
    }

    #[test]
    fn roles_search_is_optional() {
        let cli = Cli::try_parse_from(["sowcraft", "roles", "--search", "design"])
            .expect("cli should parse");
        let Commands::Roles(args) = cli.command else {
            panic!("expected roles");
        };
        assert_eq!(args.search.as_deref(), Some("design"));
    }
}
