use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "pot-translator-rust",
    version,
    about = "Translate gettext templates with LLM backends"
)]
struct Cli {
    /// Gettext template (.pot) to translate
    input: Option<String>,

    /// Target language code (repeatable, e.g. -l fr -l de)
    #[arg(short = 'l', long = "lang")]
    languages: Vec<String>,

    /// Output zip archive
    #[arg(short = 'o', long = "output", default_value = "translations.zip")]
    output: String,

    /// Model name or provider:model (e.g. openai:MODEL_ID)
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// API key (overrides environment variables)
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Source strings per model request
    #[arg(short = 'c', long = "chunk-size")]
    chunk_size: Option<usize>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Show enabled translation languages and exit
    #[arg(long = "show-enabled-languages")]
    show_enabled_languages: bool,

    /// Run the HTTP server instead of translating a file
    #[arg(long = "serve")]
    serve: bool,

    /// Server bind address
    #[arg(long = "addr", default_value = "127.0.0.1:8080")]
    addr: String,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    pot_translator_rust::logging::init(cli.verbose);

    if cli.serve {
        let settings_path = cli.read_settings.as_deref().map(std::path::Path::new);
        let settings = pot_translator_rust::settings::load_settings(settings_path)?;
        return pot_translator_rust::server::run_server(settings, cli.addr).await;
    }

    let output = pot_translator_rust::run(pot_translator_rust::Config {
        input: cli.input,
        languages: cli.languages,
        output: cli.output,
        model: cli.model,
        key: cli.key,
        chunk_size: cli.chunk_size,
        settings_path: cli.read_settings,
        show_enabled_languages: cli.show_enabled_languages,
    })
    .await?;

    println!("{output}");
    Ok(())
}
