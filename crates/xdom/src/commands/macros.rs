//! `xdom macros` command implementation.

use std::collections::BTreeMap;

use clap::Args;
use xdom::Converter;
use xdom_transform::MacroDescriptor;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the macros command.
#[derive(Args)]
pub(crate) struct MacrosArgs {
    /// Also list each macro's parameters.
    #[arg(short, long)]
    parameters: bool,
}

impl MacrosArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let converter = Converter::with_defaults();

        let mut categories: BTreeMap<&str, Vec<&MacroDescriptor>> = BTreeMap::new();
        for descriptor in converter.macros().descriptors() {
            let category = descriptor.default_category.as_deref().unwrap_or("Other");
            categories.entry(category).or_default().push(descriptor);
        }

        for (category, descriptors) in categories {
            output.heading(category)?;
            for descriptor in descriptors {
                let mut flags = Vec::new();
                if descriptor.supports_inline {
                    flags.push("inline");
                }
                if descriptor.privileged {
                    flags.push("privileged");
                }
                let summary = if flags.is_empty() {
                    descriptor.description.clone()
                } else {
                    format!("{} ({})", descriptor.description, flags.join(", "))
                };
                output.entry(&descriptor.id, &summary)?;

                if self.parameters {
                    for parameter in &descriptor.parameters {
                        let required = if parameter.mandatory { ", mandatory" } else { "" };
                        output.entry(
                            &format!("  {}", parameter.name),
                            &format!("{}{required}", parameter.parameter_type),
                        )?;
                    }
                }
            }
        }
        Ok(())
    }
}
