mod entries;
mod markup;
mod resolve;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::entries::{run_batch, run_export, run_import};
use crate::markup::{run_to_blocks, run_to_html};
use crate::resolve::run_resolve;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log engine decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Export the translatable content of one entry.
    Export {
        /// The JSON content store
        #[arg(short, long)]
        store: String,
        /// `<content-type>#<documentId>`
        #[arg(short, long)]
        element: String,
        /// Source locale
        #[arg(long, default_value = "en")]
        source: String,
    },

    /// Merge a translated document into a target locale.
    Import {
        /// The JSON content store, updated in place
        #[arg(short, long)]
        store: String,
        /// `<content-type>#<documentId>`
        #[arg(short, long)]
        element: String,
        /// Source locale
        #[arg(long, default_value = "en")]
        source: String,
        /// Target locale
        #[arg(short, long)]
        target: String,
        /// Translated document, `-` or omitted for stdin
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Import a JSON list of import requests.
    Batch {
        /// The JSON content store, updated in place
        #[arg(short, long)]
        store: String,
        /// Import requests, `-` or omitted for stdin
        #[arg(short, long)]
        input: Option<String>,
        /// Pause between entries in milliseconds
        #[arg(long, default_value_t = 100)]
        throttle_ms: u64,
        /// Stop after this many entries
        #[arg(long)]
        max_entries: Option<usize>,
    },

    /// Convert a JSON block tree to HTML.
    ToHtml {
        /// Block tree, `-` or omitted for stdin
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Convert HTML to a JSON block tree.
    ToBlocks {
        /// HTML fragment, `-` or omitted for stdin
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Show a content-type schema and the component schemas it reaches.
    Resolve {
        /// The JSON content store
        #[arg(short, long)]
        store: String,
        /// Content-type uid, e.g. `api::article.article`
        #[arg(short, long)]
        content_type: String,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "contentcodec=debug,contentcodec_cli=debug"
    } else {
        "contentcodec=info,contentcodec_cli=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.commands {
        Commands::Export {
            store,
            element,
            source,
        } => run_export(&store, &element, &source).await,
        Commands::Import {
            store,
            element,
            source,
            target,
            input,
        } => run_import(&store, &element, &source, &target, input.as_deref()).await,
        Commands::Batch {
            store,
            input,
            throttle_ms,
            max_entries,
        } => run_batch(&store, input.as_deref(), throttle_ms, max_entries).await,
        Commands::ToHtml { input } => run_to_html(input.as_deref()),
        Commands::ToBlocks { input } => run_to_blocks(input.as_deref()),
        Commands::Resolve {
            store,
            content_type,
        } => run_resolve(&store, &content_type),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
