//! The macro transformation: executes macro blocks and substitutes their
//! output.

use std::sync::Arc;

use xdom_core::{
    Block, BlockId, BlockKind, MacroCall, MetaData, Parameters, Syntax, SyntaxRegistry, TreeError,
};

use super::content::MacroContentParser;
use super::context::MacroTransformationContext;
use super::descriptor::{ContentType, DEFAULT_MACRO_PRIORITY};
use super::parameters::{DefaultParameterConverter, ParameterConverter, bind_parameters};
use super::registry::{MacroContent, MacroRegistry};
use crate::context::TransformationContext;
use crate::error::{MacroError, TransformationError, error_chain};
use crate::error_block::macro_error_blocks;
use crate::transformation::Transformation;

/// What to do when a macro fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Replace the call with a visible error block and carry on.
    #[default]
    RenderErrorBlock,
    /// Abort the pass with the macro error.
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroTransformationConfig {
    /// Nesting depth at which macros stop executing. Both nested content
    /// transformations and markers of the same macro around a call count.
    pub max_recursion_depth: usize,
    /// Macro executions allowed in one pass over one tree.
    pub max_executions: usize,
    pub on_error: ErrorPolicy,
    /// Keep executed calls as marker blocks around their output.
    pub wrap_in_marker: bool,
}

impl Default for MacroTransformationConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: 16,
            max_executions: 1000,
            on_error: ErrorPolicy::default(),
            wrap_in_marker: true,
        }
    }
}

/// An unexecuted macro block found in the tree.
struct Pending {
    id: BlockId,
    syntax: Option<Syntax>,
    priority: i32,
    /// Enclosing markers left by earlier executions of the same macro.
    reentry: usize,
}

/// Executes every macro block of a tree.
///
/// Macros run one at a time, lowest priority first, document order among
/// equals. Output that contains further macro blocks is handled by later
/// iterations of the same pass.
pub struct MacroTransformation {
    macros: Arc<MacroRegistry>,
    content_parser: MacroContentParser,
    converter: Arc<dyn ParameterConverter>,
    config: MacroTransformationConfig,
}

impl MacroTransformation {
    pub const NAME: &'static str = "macro";
    pub const PRIORITY: i32 = 100;

    pub fn new(macros: Arc<MacroRegistry>, syntaxes: Arc<SyntaxRegistry>) -> Self {
        Self {
            macros,
            content_parser: MacroContentParser::new(syntaxes),
            converter: Arc::new(DefaultParameterConverter),
            config: MacroTransformationConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: MacroTransformationConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn ParameterConverter>) -> Self {
        self.converter = converter;
        self
    }

    #[must_use]
    pub fn config(&self) -> &MacroTransformationConfig {
        &self.config
    }

    #[must_use]
    pub fn macros(&self) -> &MacroRegistry {
        &self.macros
    }

    #[must_use]
    pub fn content_parser(&self) -> &MacroContentParser {
        &self.content_parser
    }

    /// Execute the macros below `root` until none is left.
    pub fn transform_tree(
        &self,
        root: &mut Block,
        context: &TransformationContext<'_>,
    ) -> Result<(), TransformationError> {
        let mut executions = 0;
        while let Some(next) = self.next_macro(root, context) {
            let Some(block) = root.find(next.id) else {
                return Err(TreeError::NotFound(next.id).into());
            };
            let BlockKind::Macro(call) = block.kind() else {
                return Err(TreeError::NotFound(next.id).into());
            };
            let (call, parameters) = (call.clone(), block.parameters().clone());

            executions += 1;
            let result = if executions > self.config.max_executions {
                Err(MacroError::IterationLimit(self.config.max_executions))
            } else if context.depth() + next.reentry >= self.config.max_recursion_depth {
                Err(MacroError::RecursionLimit)
            } else {
                self.execute(root, &call, &parameters, next.syntax.as_ref(), context)
            };
            let output = match result {
                Ok(blocks) => blocks,
                Err(error) => self.recover(&call, error)?,
            };

            let replacement = if self.config.wrap_in_marker {
                vec![
                    Block::new(BlockKind::MacroMarker(call))
                        .with_parameters(parameters)
                        .with_children(output),
                ]
            } else {
                output
            };
            root.replace_descendant(next.id, replacement)?;
        }
        Ok(())
    }

    fn next_macro(&self, root: &Block, context: &TransformationContext<'_>) -> Option<Pending> {
        let mut pending = Vec::new();
        let syntax = syntax_of(root).or_else(|| context.syntax.clone());
        let mut markers = Vec::new();
        for child in root.children() {
            self.collect(child, syntax.as_ref(), &mut markers, &mut pending);
        }
        pending.into_iter().min_by_key(|candidate| candidate.priority)
    }

    fn collect<'b>(
        &self,
        block: &'b Block,
        syntax: Option<&Syntax>,
        markers: &mut Vec<&'b str>,
        pending: &mut Vec<Pending>,
    ) {
        if let BlockKind::Macro(call) = block.kind() {
            let priority = self
                .macros
                .resolve(&call.id, syntax)
                .map_or(DEFAULT_MACRO_PRIORITY, |m| m.descriptor().priority);
            pending.push(Pending {
                id: block.id(),
                syntax: syntax.cloned(),
                priority,
                reentry: markers.iter().filter(|id| id.eq_ignore_ascii_case(&call.id)).count(),
            });
            return;
        }
        let own = syntax_of(block);
        let syntax = own.as_ref().or(syntax);
        let marker = match block.kind() {
            BlockKind::MacroMarker(call) => Some(call.id.as_str()),
            _ => None,
        };
        markers.extend(marker);
        for child in block.children() {
            self.collect(child, syntax, markers, pending);
        }
        if marker.is_some() {
            markers.pop();
        }
    }

    fn execute(
        &self,
        root: &Block,
        call: &MacroCall,
        parameters: &Parameters,
        syntax: Option<&Syntax>,
        context: &TransformationContext<'_>,
    ) -> Result<Vec<Block>, MacroError> {
        let implementation = self
            .macros
            .resolve(&call.id, syntax)
            .ok_or_else(|| MacroError::UnknownMacro(call.id.clone()))?;
        let descriptor = implementation.descriptor();

        if call.inline && !descriptor.supports_inline {
            return Err(MacroError::NotInline);
        }
        if context.restricted && descriptor.privileged {
            return Err(MacroError::Restricted);
        }
        if context.depth() >= self.config.max_recursion_depth {
            return Err(MacroError::RecursionLimit);
        }

        let bound = bind_parameters(descriptor, parameters, self.converter.as_ref())?;
        let macro_context = MacroTransformationContext::new(self, context, root, call, syntax);

        let content = match (&descriptor.content, &call.content) {
            (None, None) => MacroContent::None,
            (None, Some(_)) => {
                tracing::debug!(macro_id = %call.id, "Ignoring content of macro without content");
                MacroContent::None
            }
            (Some(declared), None) if declared.mandatory => return Err(MacroError::MissingContent),
            (Some(_), None) => MacroContent::None,
            (Some(declared), Some(content)) => match declared.content_type {
                ContentType::Text => MacroContent::Text(content.clone()),
                ContentType::Blocks => MacroContent::Blocks(macro_context.parse_content(content)?),
                ContentType::TransformedBlocks => {
                    let blocks = macro_context.parse_content(content)?;
                    MacroContent::Blocks(macro_context.transform_content(blocks)?)
                }
            },
        };

        tracing::debug!(
            macro_id = %call.id,
            inline = call.inline,
            depth = context.depth(),
            "Executing macro"
        );
        implementation.execute(&bound, content, &macro_context)
    }

    fn recover(&self, call: &MacroCall, error: MacroError) -> Result<Vec<Block>, TransformationError> {
        match self.config.on_error {
            ErrorPolicy::Fail => Err(error.into()),
            ErrorPolicy::RenderErrorBlock => {
                tracing::warn!(macro_id = %call.id, error = %error_chain(&error), "Macro execution failed");
                Ok(macro_error_blocks(call, &error))
            }
        }
    }
}

impl Transformation for MacroTransformation {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn transform(
        &self,
        block: &mut Block,
        context: &TransformationContext<'_>,
    ) -> Result<(), TransformationError> {
        self.transform_tree(block, context)
    }
}

fn syntax_of(block: &Block) -> Option<Syntax> {
    match block.kind() {
        BlockKind::Document(metadata) | BlockKind::MetaData(metadata) => {
            metadata.get(MetaData::SYNTAX)?.parse().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use xdom_core::{EventKind, Parser, Renderer, XDom};
    use xdom_syntax::{XWikiParser, XhtmlRenderer};

    use super::*;
    use crate::error_block::{DESCRIPTION_CLASS, ERROR_CLASS};
    use crate::macros::{BoundParameters, ContentDescriptor, Macro, MacroDescriptor, ParameterDescriptor, ParameterType};
    use crate::manager::TransformationManager;

    type Run = dyn Fn(&BoundParameters, MacroContent, &MacroTransformationContext<'_>) -> Result<Vec<Block>, MacroError>
        + Send
        + Sync;

    struct TestMacro {
        descriptor: MacroDescriptor,
        run: Box<Run>,
    }

    impl TestMacro {
        fn new(
            descriptor: MacroDescriptor,
            run: impl Fn(&BoundParameters, MacroContent, &MacroTransformationContext<'_>) -> Result<Vec<Block>, MacroError>
            + Send
            + Sync
            + 'static,
        ) -> Self {
            Self {
                descriptor,
                run: Box::new(run),
            }
        }
    }

    impl Macro for TestMacro {
        fn descriptor(&self) -> &MacroDescriptor {
            &self.descriptor
        }

        fn execute(
            &self,
            parameters: &BoundParameters,
            content: MacroContent,
            context: &MacroTransformationContext<'_>,
        ) -> Result<Vec<Block>, MacroError> {
            (self.run)(parameters, content, context)
        }
    }

    fn echo() -> TestMacro {
        let descriptor = MacroDescriptor::new("echo", "Echo")
            .inline()
            .with_parameter(ParameterDescriptor::new("text", ParameterType::String).mandatory())
            .with_parameter(ParameterDescriptor::new("count", ParameterType::Integer).with_default("1"));
        TestMacro::new(descriptor, |parameters, _, _| {
            let text = parameters.string("text").unwrap_or_default();
            let count = parameters.integer("count").unwrap_or(1);
            Ok((0..count).map(|_| Block::word(text)).collect())
        })
    }

    /// Calls itself through a nested content transformation, forever.
    fn nest() -> TestMacro {
        TestMacro::new(MacroDescriptor::new("nest", "Nest"), |_, _, context| {
            let call = Block::new(BlockKind::Macro(MacroCall::new("nest", None, false)));
            context.transform_content(vec![call])
        })
    }

    /// Outputs a new call to itself.
    fn again() -> TestMacro {
        TestMacro::new(MacroDescriptor::new("again", "Again"), |_, _, _| {
            Ok(vec![Block::new(BlockKind::Macro(MacroCall::new("again", None, false)))])
        })
    }

    fn wrap() -> TestMacro {
        let descriptor = MacroDescriptor::new("wrap", "Wrap")
            .inline()
            .with_content(ContentDescriptor::new(ContentType::TransformedBlocks).mandatory());
        TestMacro::new(descriptor, |_, content, _| Ok(content.into_blocks()))
    }

    fn script() -> TestMacro {
        let descriptor = MacroDescriptor::new("script", "Script").privileged();
        TestMacro::new(descriptor, |_, _, _| Ok(vec![Block::word("ran")]))
    }

    fn engine(config: MacroTransformationConfig, extra: Vec<TestMacro>) -> MacroTransformation {
        let mut macros = MacroRegistry::new();
        for implementation in [echo(), nest(), again(), wrap(), script()].into_iter().chain(extra) {
            macros.register(implementation);
        }
        MacroTransformation::new(Arc::new(macros), Arc::new(xdom_syntax::default_registry()))
            .with_config(config)
    }

    fn run_with(
        engine: MacroTransformation,
        source: &str,
        context: &TransformationContext<'_>,
    ) -> Result<XDom, TransformationError> {
        let mut xdom = XWikiParser.parse(source).unwrap();
        TransformationManager::new()
            .with(engine)
            .transform_xdom(&mut xdom, context)?;
        Ok(xdom)
    }

    fn run(source: &str) -> XDom {
        run_with(
            engine(MacroTransformationConfig::default(), Vec::new()),
            source,
            &TransformationContext::new(),
        )
        .unwrap()
    }

    fn errors(xdom: &XDom) -> Vec<String> {
        xdom.root()
            .descendants()
            .filter(|block| block.parameter("class") == Some(DESCRIPTION_CLASS))
            .map(Block::plain_text)
            .collect()
    }

    fn fail_config() -> MacroTransformationConfig {
        MacroTransformationConfig {
            on_error: ErrorPolicy::Fail,
            ..MacroTransformationConfig::default()
        }
    }

    #[test]
    fn test_substitutes_output_inside_marker() {
        let xdom = run("{{echo text=\"hi\" count=\"2\"/}}");
        let marker = &xdom.children()[0];
        assert_eq!(marker.event_kind(), EventKind::MacroMarker);
        assert_eq!(marker.macro_call().map(|call| call.id.as_str()), Some("echo"));
        assert_eq!(marker.parameter("count"), Some("2"));
        assert_eq!(marker.plain_text(), "hihi");
        assert!(xdom.root().first_block_by_type(EventKind::Macro).is_none());
    }

    #[test]
    fn test_without_marker_output_is_spliced() {
        let config = MacroTransformationConfig {
            wrap_in_marker: false,
            ..MacroTransformationConfig::default()
        };
        let xdom = run_with(
            engine(config, Vec::new()),
            "before\n\n{{echo text=\"x\"/}}\n\nafter",
            &TransformationContext::new(),
        )
        .unwrap();
        let kinds: Vec<_> = xdom.children().iter().map(Block::event_kind).collect();
        assert_eq!(kinds, vec![EventKind::Paragraph, EventKind::Word, EventKind::Paragraph]);
    }

    #[test]
    fn test_failed_macro_leaves_sibling_untouched() {
        let xdom = run("{{echo text=\"a\"/}}\n\n{{echo/}}\n\n{{echo text=\"b\"/}}");
        let texts: Vec<_> = xdom.children().iter().map(Block::plain_text).collect();
        assert_eq!(texts[0], "a");
        assert_eq!(texts[2], "b");
        assert_eq!(errors(&xdom), vec!["missing mandatory parameter 'text'".to_owned()]);
    }

    #[test]
    fn test_conversion_failure_names_parameter_and_value() {
        let xdom = run("{{echo text=\"a\" count=\"lots\"/}}");
        assert_eq!(
            errors(&xdom),
            vec!["invalid value 'lots' for parameter 'count': expected integer".to_owned()]
        );
    }

    #[test]
    fn test_unknown_macro_becomes_error_block() {
        let xdom = run("{{nope/}}\n\ntext");
        let message = xdom
            .root()
            .descendants()
            .find(|block| block.parameter("class") == Some(ERROR_CLASS))
            .map(Block::plain_text);
        assert_eq!(message.as_deref(), Some("Unknown macro: nope."));
        assert_eq!(xdom.children()[1].plain_text(), "text");
    }

    #[test]
    fn test_fail_policy_propagates() {
        let result = run_with(engine(fail_config(), Vec::new()), "{{nope/}}", &TransformationContext::new());
        let Err(TransformationError::Failed { transformation, source }) = result else {
            panic!("expected a failed pass");
        };
        assert_eq!(transformation, "macro");
        assert!(matches!(*source, TransformationError::Macro(MacroError::UnknownMacro(ref id)) if id == "nope"));
    }

    #[test]
    fn test_recursion_guard_renders_error_at_bound() {
        let xdom = run("{{nest/}}");
        let markers = xdom.root().children_by_type(EventKind::MacroMarker, true).count();
        assert_eq!(markers, 17);
        assert_eq!(errors(&xdom), vec!["maximum recursion depth exceeded".to_owned()]);
    }

    #[test]
    fn test_recursion_guard_with_fail_policy() {
        let config = MacroTransformationConfig {
            max_recursion_depth: 4,
            ..fail_config()
        };
        let err = run_with(engine(config, Vec::new()), "{{nest/}}", &TransformationContext::new()).unwrap_err();

        let mut chain = Vec::new();
        let mut current: Option<&dyn std::error::Error> = Some(&err);
        while let Some(error) = current {
            chain.push(error.to_string());
            current = error.source();
        }
        assert_eq!(chain.last().map(String::as_str), Some("maximum recursion depth exceeded"));
        let nested = chain.iter().filter(|m| *m == "failed to transform macro content").count();
        assert_eq!(nested, 4);
    }

    #[test]
    fn test_execution_cap_stops_self_regeneration() {
        let config = MacroTransformationConfig {
            max_executions: 5,
            ..MacroTransformationConfig::default()
        };
        let xdom = run_with(engine(config, Vec::new()), "{{again/}}", &TransformationContext::new()).unwrap();
        let markers = xdom.root().children_by_type(EventKind::MacroMarker, true).count();
        assert_eq!(markers, 6);
        assert_eq!(
            errors(&xdom),
            vec!["maximum number of macro executions (5) exceeded".to_owned()]
        );
    }

    #[test]
    fn test_self_regeneration_stops_at_recursion_depth() {
        let config = MacroTransformationConfig {
            max_recursion_depth: 3,
            ..MacroTransformationConfig::default()
        };
        let xdom = run_with(engine(config, Vec::new()), "{{again/}}", &TransformationContext::new()).unwrap();
        let markers = xdom.root().children_by_type(EventKind::MacroMarker, true).count();
        assert_eq!(markers, 4);
        assert_eq!(errors(&xdom), vec!["maximum recursion depth exceeded".to_owned()]);
    }

    #[test]
    fn test_sibling_calls_of_same_macro_do_not_nest() {
        let config = MacroTransformationConfig {
            max_recursion_depth: 1,
            ..MacroTransformationConfig::default()
        };
        let xdom = run_with(
            engine(config, Vec::new()),
            "{{echo text=\"a\"/}}\n\n{{echo text=\"b\"/}}",
            &TransformationContext::new(),
        )
        .unwrap();
        assert!(errors(&xdom).is_empty());
        let texts: Vec<_> = xdom
            .children()
            .iter()
            .map(Block::plain_text)
            .filter(|text| !text.is_empty())
            .collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_priority_then_document_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let recorder = |id: &'static str, priority: i32| {
            let log = Arc::clone(&log);
            TestMacro::new(MacroDescriptor::new(id, id).with_priority(priority), move |_, _, _| {
                log.lock().unwrap().push(id);
                Ok(Vec::new())
            })
        };
        let extra = vec![recorder("late", 2000), recorder("first", 10), recorder("mid", 500)];
        run_with(
            engine(MacroTransformationConfig::default(), extra),
            "{{late/}}\n\n{{mid/}}\n\n{{first/}}\n\n{{mid/}}",
            &TransformationContext::new(),
        )
        .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "mid", "mid", "late"]);
    }

    #[test]
    fn test_inline_content_is_parsed_and_transformed() {
        let xdom = run("Say {{wrap}}**hi** {{echo text=\"there\"/}}{{/wrap}} now");
        let paragraph = &xdom.children()[0];
        let marker = paragraph.first_block_by_type(EventKind::MacroMarker).unwrap();
        assert_eq!(marker.children()[0].event_kind(), EventKind::Format);
        assert_eq!(marker.plain_text(), "hi there");
        assert!(xdom.root().first_block_by_type(EventKind::Macro).is_none());
    }

    #[test]
    fn test_block_macro_used_inline_is_refused() {
        let xdom = run("Say {{nest/}} now");
        assert_eq!(errors(&xdom), vec!["macro cannot be used inline".to_owned()]);
        let error = xdom
            .root()
            .descendants()
            .find(|block| block.parameter("class") == Some(ERROR_CLASS))
            .map(Block::event_kind);
        assert_eq!(error, Some(EventKind::Format));
    }

    #[test]
    fn test_restricted_refuses_privileged_macros() {
        let source = "{{script/}}";
        let allowed = run(source);
        assert_eq!(allowed.root().plain_text(), "ran");

        let context = TransformationContext::new().with_restricted(true);
        let refused = run_with(engine(MacroTransformationConfig::default(), Vec::new()), source, &context).unwrap();
        assert_eq!(errors(&refused), vec!["macro is not allowed in restricted mode".to_owned()]);
    }

    #[test]
    fn test_error_block_renders_as_xhtml() {
        let xdom = run("{{nope/}}");
        assert_eq!(
            XhtmlRenderer.render(xdom.root()).unwrap(),
            "<div class=\"rendering-error\">Unknown macro: nope.</div>\
             <div class=\"rendering-error-description\">unknown macro: nope</div>"
        );
    }
}
