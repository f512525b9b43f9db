//! `xdom syntaxes` command implementation.

use xdom::Converter;

use crate::error::CliError;
use crate::output::Output;

/// List the parser and renderer syntaxes of the bundled registry.
pub(crate) fn execute() -> Result<(), CliError> {
    let output = Output::new();
    let converter = Converter::with_defaults();
    let registry = converter.syntaxes();

    let mut parsers: Vec<String> = registry.parser_syntaxes().map(ToString::to_string).collect();
    let mut renderers: Vec<String> = registry.renderer_syntaxes().map(ToString::to_string).collect();
    parsers.sort();
    renderers.sort();

    output.heading("Input syntaxes")?;
    for syntax in &parsers {
        output.entry(syntax, "")?;
    }
    output.heading("Output syntaxes")?;
    for syntax in &renderers {
        output.entry(syntax, "")?;
    }
    Ok(())
}
