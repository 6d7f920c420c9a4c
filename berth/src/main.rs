use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod context;
mod format;

use commands::RegistryArgs;

/// Berth - container configuration resolver
///
/// Search registries, inspect image defaults and resolve saved
/// multi-container application configurations.
#[derive(Parser, Debug)]
#[command(name = "berth")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format: pretty, json, yaml
    #[arg(short, long, global = true, default_value = "pretty")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display version information
    Version,
    /// Search for images
    Search {
        /// Search query (popular images when omitted)
        query: Option<String>,
        /// Limit number of results
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        registry: RegistryArgs,
    },
    /// List tags for an image
    Tags {
        /// Image name ([namespace/]name[:tag])
        image: String,
        #[command(flatten)]
        registry: RegistryArgs,
    },
    /// Show the ports and volumes an image declares
    Inspect {
        /// Image reference ([namespace/]name[:tag])
        image: String,
        #[command(flatten)]
        registry: RegistryArgs,
    },
    /// Validate private registry credentials
    Login {
        /// Registry URL
        url: String,
        /// Username (will prompt if not provided)
        #[arg(short, long)]
        username: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long, env = "BERTH_REGISTRY_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Resolve a saved application and print its payload
    Resolve {
        /// Saved application (YAML or JSON list of containers)
        file: PathBuf,
    },
    /// Import or export container environment variables
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
enum EnvCommands {
    /// Export a container's variables to a delimited file
    Export {
        /// Saved application file
        file: PathBuf,
        /// Container index
        #[arg(short, long, default_value_t = 0)]
        container: usize,
        /// Output file (defaults to a timestamped name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Append variables from a delimited file to a container
    Import {
        /// Saved application file, updated in place
        file: PathBuf,
        /// `key;value` or `key,value` lines
        csv: PathBuf,
        /// Container index
        #[arg(short, long, default_value_t = 0)]
        container: usize,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let verbosity = context::VerbosityLevel::from_count(cli.verbose);
    context::init_tracing(verbosity);

    let build_ctx = || {
        context::AppContext::build(format::OutputFormat::from(cli.format.as_str()))
            .unwrap_or_else(|e| format::fail(&e))
    };

    match cli.command {
        Commands::Version => {
            commands::version::print_version();
        }
        Commands::Search {
            ref query,
            limit,
            ref registry,
        } => {
            let ctx = build_ctx();
            commands::image::handlers::handle_search(&ctx, query.as_deref(), limit, registry)
                .await;
        }
        Commands::Tags {
            ref image,
            ref registry,
        } => {
            let ctx = build_ctx();
            commands::image::handlers::handle_tags(&ctx, image, registry).await;
        }
        Commands::Inspect {
            ref image,
            ref registry,
        } => {
            let ctx = build_ctx();
            commands::image::handlers::handle_inspect(&ctx, image, registry).await;
        }
        Commands::Login {
            ref url,
            ref username,
            ref password,
        } => {
            let ctx = build_ctx();
            commands::login::handle_login(&ctx, url, username.as_deref(), password.as_deref())
                .await;
        }
        Commands::Resolve { ref file } => {
            let ctx = build_ctx();
            commands::resolve::handle_resolve(&ctx, file).await;
        }
        Commands::Env { ref command } => match command {
            EnvCommands::Export {
                file,
                container,
                output,
            } => commands::env::handle_env_export(file, *container, output.as_deref()),
            EnvCommands::Import {
                file,
                csv,
                container,
            } => commands::env::handle_env_import(file, csv, *container),
        },
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
    }
}
