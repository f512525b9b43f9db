//! The parse, transform, render pipeline.

use std::sync::Arc;

use xdom_config::{Config, ConfigError, MacrosConfig, OnError};
use xdom_core::{ParseError, RenderError, Syntax, SyntaxRegistry, XDom};
use xdom_transform::{
    ErrorPolicy, MacroRegistry, MacroTransformation, MacroTransformationConfig, Transformation,
    TransformationContext, TransformationError, TransformationManager, TransformationRegistry,
};

/// Failure anywhere in a conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("no parser for syntax {0}")]
    UnknownParser(Syntax),
    #[error("no renderer for syntax {0}")]
    UnknownRenderer(Syntax),
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Transformation(#[from] TransformationError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Converts documents between the syntaxes of a registry, running the
/// enabled transformations in between.
pub struct Converter {
    syntaxes: Arc<SyntaxRegistry>,
    macros: Arc<MacroRegistry>,
    transformations: TransformationRegistry,
    manager: TransformationManager,
}

fn macro_config(config: &MacrosConfig) -> MacroTransformationConfig {
    MacroTransformationConfig {
        max_recursion_depth: config.max_recursion_depth,
        max_executions: config.max_executions,
        on_error: match config.on_error {
            OnError::Render => ErrorPolicy::RenderErrorBlock,
            OnError::Fail => ErrorPolicy::Fail,
        },
        wrap_in_marker: config.wrap_in_marker,
    }
}

/// Context for converting documents under `config`.
pub fn transformation_context(config: &Config) -> TransformationContext<'static> {
    TransformationContext::new()
        .with_syntax(config.rendering_resolved.source_syntax.clone())
        .with_target_syntax(config.rendering_resolved.target_syntax.clone())
        .with_restricted(config.macros.restricted)
}

impl Converter {
    /// Converter running only the macro transformation.
    pub fn new(
        syntaxes: Arc<SyntaxRegistry>,
        macros: Arc<MacroRegistry>,
        config: MacroTransformationConfig,
    ) -> Self {
        let engine = MacroTransformation::new(Arc::clone(&macros), Arc::clone(&syntaxes)).with_config(config);
        let engine: Arc<dyn Transformation> = Arc::new(engine);

        let mut transformations = TransformationRegistry::new();
        transformations.register_arc(Arc::clone(&engine));
        let mut manager = TransformationManager::new();
        manager.add(engine);

        Self {
            syntaxes,
            macros,
            transformations,
            manager,
        }
    }

    /// Every bundled syntax and built-in macro, with default limits.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(xdom_syntax::default_registry()),
            Arc::new(xdom_macros::builtin_registry()),
            MacroTransformationConfig::default(),
        )
    }

    /// Bundled syntaxes and macros, set up as `config` describes.
    pub fn from_config(config: &Config) -> Result<Self, ConvertError> {
        let mut converter = Self::new(
            Arc::new(xdom_syntax::default_registry()),
            Arc::new(xdom_macros::builtin_registry()),
            macro_config(&config.macros),
        );
        config.check_transformations(converter.transformations.names())?;
        converter.manager =
            TransformationManager::from_registry(&converter.transformations, &config.transformations.enabled)?;
        Ok(converter)
    }

    /// Make `transformation` available and run it in every conversion.
    #[must_use]
    pub fn with_transformation(mut self, transformation: impl Transformation + 'static) -> Self {
        let transformation: Arc<dyn Transformation> = Arc::new(transformation);
        self.transformations.register_arc(Arc::clone(&transformation));
        self.manager.add(transformation);
        self
    }

    #[must_use]
    pub fn syntaxes(&self) -> &SyntaxRegistry {
        &self.syntaxes
    }

    #[must_use]
    pub fn macros(&self) -> &MacroRegistry {
        &self.macros
    }

    /// Transformations run by [`transform`](Self::transform), in order.
    pub fn transformation_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.manager.names()
    }

    pub fn parse(&self, source: &str, from: &Syntax) -> Result<XDom, ConvertError> {
        let parser = self
            .syntaxes
            .parser(from)
            .ok_or_else(|| ConvertError::UnknownParser(from.clone()))?;
        Ok(parser.parse(source)?)
    }

    pub fn transform(&self, xdom: &mut XDom, context: &TransformationContext<'_>) -> Result<(), ConvertError> {
        Ok(self.manager.transform_xdom(xdom, context)?)
    }

    pub fn render(&self, xdom: &XDom, to: &Syntax) -> Result<String, ConvertError> {
        let renderer = self
            .syntaxes
            .renderer(to)
            .ok_or_else(|| ConvertError::UnknownRenderer(to.clone()))?;
        Ok(renderer.render(xdom.root())?)
    }

    /// Parse `source` as `from`, transform it and render it as `to`.
    pub fn convert(
        &self,
        source: &str,
        from: &Syntax,
        to: &Syntax,
        context: &TransformationContext<'_>,
    ) -> Result<String, ConvertError> {
        let renderer = self
            .syntaxes
            .renderer(to)
            .ok_or_else(|| ConvertError::UnknownRenderer(to.clone()))?;
        let mut xdom = self.parse(source, from)?;
        let mut context = context.clone();
        context.target_syntax.get_or_insert_with(|| to.clone());
        self.transform(&mut xdom, &context)?;

        tracing::debug!(from = %from, to = %to, "Rendering document");
        Ok(renderer.render(xdom.root())?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xdom_core::{Block, EventKind, Format};

    use super::*;

    fn convert(source: &str, from: &Syntax, to: &Syntax) -> String {
        Converter::with_defaults()
            .convert(source, from, to, &TransformationContext::new())
            .unwrap()
    }

    /// Wraps every link in italics.
    struct ItalicLinks;

    impl Transformation for ItalicLinks {
        fn name(&self) -> &'static str {
            "italic-links"
        }

        fn transform(
            &self,
            block: &mut Block,
            _context: &TransformationContext<'_>,
        ) -> Result<(), TransformationError> {
            let links: Vec<_> = block.children_by_type(EventKind::Link, false).map(Block::id).collect();
            for id in links {
                block.map_descendant(id, |link| vec![Block::format(Format::Italic, vec![link])])?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_bold_to_xhtml() {
        assert_eq!(
            convert("This is **bold**", &Syntax::XWIKI_2_1, &Syntax::XHTML_1_0),
            "<p>This is <strong>bold</strong></p>"
        );
    }

    #[test]
    fn test_link_transformation_round_trip() {
        let converter = Converter::with_defaults().with_transformation(ItalicLinks);
        let output = converter
            .convert(
                "Read [[the guide>>https://example.org]].",
                &Syntax::XWIKI_2_1,
                &Syntax::XWIKI_2_1,
                &TransformationContext::new(),
            )
            .unwrap();
        assert_eq!(output, "Read //[[the guide>>https://example.org]]//.");
    }

    #[test]
    fn test_id_macro_to_xhtml() {
        assert_eq!(
            convert("{{id name=\"test\"/}}", &Syntax::XWIKI_2_1, &Syntax::XHTML_1_0),
            "<div id=\"test\"></div>"
        );
    }

    #[test]
    fn test_paragraph_of_silent_macros_is_elided() {
        assert_eq!(
            convert(
                "{{comment}}a{{/comment}}{{comment}}b{{/comment}}\n\nkept",
                &Syntax::XWIKI_2_1,
                &Syntax::XHTML_1_0
            ),
            "<p>kept</p>"
        );
    }

    #[test]
    fn test_markdown_to_xwiki() {
        assert_eq!(
            convert("# Title\n\nSome **bold** text", &Syntax::MARKDOWN_1_2, &Syntax::XWIKI_2_1),
            "= Title =\n\nSome **bold** text"
        );
    }

    #[test]
    fn test_unknown_syntaxes() {
        let converter = Converter::with_defaults();
        let context = TransformationContext::new();
        let err = converter
            .convert("x", &Syntax::new("confluence", "1.0"), &Syntax::XHTML_1_0, &context)
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnknownParser(_)));
        let err = converter
            .convert("x", &Syntax::XWIKI_2_1, &Syntax::MARKDOWN_1_2, &context)
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnknownRenderer(_)));
    }

    #[test]
    fn test_config_drives_pipeline() {
        let mut config = Config::default();
        config.macros.restricted = true;
        let converter = Converter::from_config(&config).unwrap();
        assert_eq!(converter.transformation_names().collect::<Vec<_>>(), vec!["macro"]);

        let output = converter
            .convert(
                "{{html}}<b>x</b>{{/html}}",
                &Syntax::XWIKI_2_1,
                &Syntax::XHTML_1_0,
                &transformation_context(&config),
            )
            .unwrap();
        assert_eq!(output, "<pre>&lt;b&gt;x&lt;/b&gt;</pre>");
    }

    #[test]
    fn test_config_without_transformations_keeps_macros() {
        let mut config = Config::default();
        config.transformations.enabled.clear();
        let converter = Converter::from_config(&config).unwrap();
        let output = converter
            .convert("{{id name=\"x\"/}}", &Syntax::XWIKI_2_1, &Syntax::XWIKI_2_1, &TransformationContext::new())
            .unwrap();
        assert_eq!(output, "{{id name=\"x\"/}}");
    }

    #[test]
    fn test_config_with_unknown_transformation() {
        let mut config = Config::default();
        config.transformations.enabled.push("toc".to_owned());
        let err = Converter::from_config(&config).err();
        assert!(matches!(
            err,
            Some(ConvertError::Config(ConfigError::UnknownTransformation(name))) if name == "toc"
        ));
    }

    #[test]
    fn test_fail_policy_surfaces_macro_errors() {
        let mut config = Config::default();
        config.macros.on_error = OnError::Fail;
        let converter = Converter::from_config(&config).unwrap();
        let err = converter
            .convert("{{nope/}}", &Syntax::XWIKI_2_1, &Syntax::XHTML_1_0, &TransformationContext::new())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Transformation(TransformationError::Failed { .. })));
    }
}
