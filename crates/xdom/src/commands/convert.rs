//! `xdom convert` command implementation.

use std::io::Read as _;
use std::path::PathBuf;

use clap::Args;
use xdom::{Converter, transformation_context};
use xdom_config::{CliSettings, Config};
use xdom_core::Syntax;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Input file (default: stdin).
    input: Option<PathBuf>,

    /// Write the result to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover xdom.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source syntax, as type/version (overrides config).
    #[arg(short, long, env = "XDOM_FROM")]
    from: Option<Syntax>,

    /// Target syntax, as type/version (overrides config).
    #[arg(short, long, env = "XDOM_TO")]
    to: Option<Syntax>,

    /// Refuse privileged macros and escape raw HTML.
    #[arg(long)]
    restricted: bool,

    /// Maximum macro nesting depth (overrides config).
    #[arg(long)]
    max_recursion_depth: Option<usize>,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, I/O or the conversion fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        if let (Some(input), Some(target)) = (&self.input, &self.output)
            && input == target
        {
            return Err(CliError::Validation(format!(
                "refusing to overwrite the input file {}",
                input.display()
            )));
        }

        let cli_settings = CliSettings {
            source_syntax: self.from,
            target_syntax: self.to,
            restricted: self.restricted.then_some(true),
            max_recursion_depth: self.max_recursion_depth,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let converter = Converter::from_config(&config)?;
        let from = &config.rendering_resolved.source_syntax;
        let to = &config.rendering_resolved.target_syntax;
        if converter.syntaxes().parser(from).is_none() {
            output.warning(&format!("No parser for {from}; see `xdom syntaxes`"));
        }

        let source = match &self.input {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut source = String::new();
                std::io::stdin().read_to_string(&mut source)?;
                source
            }
        };

        tracing::info!(%from, %to, bytes = source.len(), "Converting");
        let rendered = converter.convert(&source, from, to, &transformation_context(&config))?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, format!("{rendered}\n"))?;
                tracing::info!(path = %path.display(), "Wrote output");
            }
            None => output.data(&rendered)?,
        }
        Ok(())
    }
}
