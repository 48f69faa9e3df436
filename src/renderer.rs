//! Template renderer
//!
//! Walks a compiled [`Template`] and concatenates literal text with resolved
//! variable values. The first failing reference aborts the render and no
//! partial output is returned.

use crate::parser::{Segment, Template};
use crate::variable::{resolve, Registry, ResolveError, ValueCache};

/// Render `template` against `registry`, memoizing through `cache`
pub fn render<C: ?Sized>(
    template: &Template,
    registry: &Registry<C>,
    cache: &mut ValueCache,
    ctx: &C,
) -> Result<String, ResolveError> {
    let mut output = String::new();

    for segment in template.segments() {
        match segment {
            Segment::Literal(text) => output.push_str(text),
            Segment::Variable(name) => {
                let value = resolve(registry, cache, name, ctx)?;
                output.push_str(&value);
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;
    use crate::variable::{Variable, VariableValue};

    fn registry() -> (Registry, ValueCache) {
        let mut registry: Registry = Registry::new();
        let mut cache = ValueCache::new();
        registry
            .register(
                Variable::from_fn("name", |_, _| Ok(VariableValue::found("alex"))),
                &mut cache,
            )
            .unwrap();
        registry
            .register(
                Variable::from_fn("missing", |_, _| Ok(VariableValue::not_found())),
                &mut cache,
            )
            .unwrap();
        (registry, cache)
    }

    #[test]
    fn test_render_literals_and_variables() {
        let (registry, mut cache) = registry();
        let template = tokenize("hi $name, ${name}!").unwrap();
        let out = render(&template, &registry, &mut cache, &()).unwrap();
        assert_eq!(out, "hi alex, alex!");
    }

    #[test]
    fn test_render_escaped_dollar() {
        let (registry, mut cache) = registry();
        let template = tokenize("$$$name$$").unwrap();
        let out = render(&template, &registry, &mut cache, &()).unwrap();
        assert_eq!(out, "$alex$");
    }

    #[test]
    fn test_render_aborts_on_first_error() {
        let (registry, mut cache) = registry();
        let template = tokenize("$name $missing $ghost").unwrap();
        let err = render(&template, &registry, &mut cache, &()).unwrap_err();
        assert!(matches!(err, ResolveError::ValueNotFound { name } if name == "missing"));
    }

    #[test]
    fn test_render_unregistered_reference() {
        let (registry, mut cache) = registry();
        let template = tokenize("$ghost").unwrap();
        let err = render(&template, &registry, &mut cache, &()).unwrap_err();
        assert_eq!(err.to_string(), "variable \"ghost\" not found");
    }
}
