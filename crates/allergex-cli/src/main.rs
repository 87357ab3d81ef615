//! allergex: extract species/allergen associations from a file or the
//! terminal and save them to a YAML results file.

use std::path::PathBuf;

use allergex_cli::input::{self, InputMode};
use allergex_cli::output;
use allergex_config::Settings;
use allergex_nlp::Engine;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "allergex", version, about = "Input where text would be retrieved.")]
struct Args {
    /// File or cli based input
    #[arg(long, value_enum)]
    input: InputMode,

    /// File path where text is located (file mode)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Where to write the results
    #[arg(long, default_value = "result.yaml")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("allergex=debug,info")),
        )
        .init();

    let args = Args::parse();

    info!("Verification of parameters");
    let path = input::verify(args.input, args.path.as_deref())?;

    info!("Begin extraction");
    let texts = match path {
        Some(path) => input::read_file(&path)?,
        None => input::read_interactive(std::io::stdin().lock(), std::io::stdout())?,
    };

    info!("Loading engine");
    let settings = Settings::load()?;
    let annotator = settings.annotator.build()?;
    let engine = Engine::new(settings.lexicon(), annotator).await?;

    info!("Fitting {} text(s)", texts.len());
    let mut results = Vec::with_capacity(texts.len());
    for text in &texts {
        let records = engine.fit(text).await?;
        output::print_records(std::io::stdout().lock(), &records)?;
        results.push(records);
    }

    output::save_results(&args.output, results)?;
    Ok(())
}
