//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::WebsiteType;

/// Sitesmith: generate complete websites from form data
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sitesmith.toml)
    #[arg(short = 'C', long, global = true, default_value = "sitesmith.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP API server
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Public origin used as base href in preview HTML
        #[arg(short = 'U', long = "public-url", value_hint = clap::ValueHint::Url)]
        public_url: Option<String>,
    },

    /// Generate a website from a form data file and write the archive
    #[command(visible_alias = "g")]
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// List supported website types
    #[command(visible_alias = "t")]
    Types,
}

/// Generate command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Website type (portfolio, business, blog, event, news, article)
    #[arg(short = 't', long = "type")]
    pub website_type: WebsiteType,

    /// JSON file with the form data
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub data: PathBuf,

    /// Color scheme passed to the model (e.g., modern-blue)
    #[arg(short = 's', long = "color", default_value = "modern-blue")]
    pub color_scheme: String,

    /// JSON file with design customizations
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub customizations: Option<PathBuf>,

    /// JSON file with a list of already uploaded assets
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub assets: Option<PathBuf>,

    /// Archive output path
    #[arg(short, long, default_value = "website.zip", value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// Also write the preview HTML (inlined images) to this path
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub preview: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_and_version_flags() {
        let cli = Cli::try_parse_from(["sitesmith", "-v", "types"]).unwrap();
        assert!(cli.verbose);
        let cli = Cli::try_parse_from(["sitesmith", "types", "--verbose"]).unwrap();
        assert!(cli.verbose);

        let err = Cli::try_parse_from(["sitesmith", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["sitesmith", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve { port, interface, .. } => {
                assert_eq!(port, Some(8080));
                assert!(interface.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "sitesmith", "generate", "-t", "portfolio", "-d", "form.json", "-o", "out.zip",
        ])
        .unwrap();
        let Commands::Generate { args } = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.website_type, WebsiteType::Portfolio);
        assert_eq!(args.color_scheme, "modern-blue");
        assert_eq!(args.output, PathBuf::from("out.zip"));
    }

    #[test]
    fn test_parse_generate_rejects_unknown_type() {
        let result = Cli::try_parse_from(["sitesmith", "generate", "-t", "shop", "-d", "f.json"]);
        assert!(result.is_err());
    }
}
