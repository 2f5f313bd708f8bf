use serde_json::Value;

use crate::parse::{parse, Node};
use crate::{coerce, lambdas, Result};

/// Renders `template` against the JSON projection of the state.
///
/// `{{name}}` expands a field, dotted paths navigate nested objects,
/// `{{#name}}…{{/name}}` enters a section (an object scopes the context, an
/// array repeats, a scalar renders once when truthy) and section names from
/// the fixed lambda table transform their rendered body instead.
///
/// # Errors
///
/// Returns an error when the template is malformed; missing values render
/// as empty text.
pub fn render(template: &str, context: &Value) -> Result<String> {
    let nodes = parse(template)?;
    let mut output = String::new();
    let mut scopes = vec![context];
    render_nodes(&nodes, &mut scopes, &mut output);
    Ok(output)
}

fn render_nodes<'a>(nodes: &[Node], scopes: &mut Vec<&'a Value>, output: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => output.push_str(text),
            Node::Variable(name) => output.push_str(&scalar_text(lookup(scopes, name))),
            Node::Section { name, children } => render_section(name, children, scopes, output),
        }
    }
}

fn render_section<'a>(
    name: &str,
    children: &[Node],
    scopes: &mut Vec<&'a Value>,
    output: &mut String,
) {
    // lambda names shadow state fields, the table is fixed
    if lambdas::is_lambda(name) {
        let mut body = String::new();
        render_nodes(children, scopes, &mut body);
        if let Some(result) = lambdas::apply(name, &body) {
            output.push_str(&result);
        }
        return;
    }

    match lookup(scopes, name) {
        Some(value @ Value::Object(_)) => {
            scopes.push(value);
            render_nodes(children, scopes, output);
            scopes.pop();
        }
        Some(Value::Array(items)) => {
            for item in items {
                scopes.push(item);
                render_nodes(children, scopes, output);
                scopes.pop();
            }
        }
        Some(value) => {
            if is_truthy(value) {
                render_nodes(children, scopes, output);
            }
        }
        None => {}
    }
}

fn lookup<'a>(scopes: &[&'a Value], path: &str) -> Option<&'a Value> {
    for scope in scopes.iter().rev() {
        let mut current = *scope;
        let mut found = true;
        for segment in path.split('.') {
            match current.get(segment) {
                Some(next) => current = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if found {
            return Some(current);
        }
    }
    None
}

fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => coerce::to_boolean(s),
        Value::Number(n) => {
            n.as_i64().is_some_and(|n| n != 0) || n.as_f64().is_some_and(|f| f != 0.0)
        }
        Value::Null => false,
        Value::Object(_) | Value::Array(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_a_plain_variable() {
        let context = json!({"version": "1.2.3"});
        assert_eq!(
            render("release {{version}}", &context).unwrap(),
            "release 1.2.3"
        );
    }

    #[test]
    fn dotted_paths_navigate_nested_objects() {
        let context = json!({"releaseScope": {"previousVersion": "1.2.3"}});
        assert_eq!(
            render("{{releaseScope.previousVersion}}", &context).unwrap(),
            "1.2.3"
        );
    }

    #[test]
    fn missing_values_render_empty() {
        let context = json!({});
        assert_eq!(render("[{{absent}}]", &context).unwrap(), "[]");
    }

    #[test]
    fn numbers_and_booleans_render_naturally() {
        let context = json!({"timestamp": 1577880000000_i64, "newVersion": true});
        assert_eq!(
            render("{{timestamp}}/{{newVersion}}", &context).unwrap(),
            "1577880000000/true"
        );
    }

    #[test]
    fn object_section_scopes_the_context() {
        let context = json!({"scope": {"previousVersion": "0.9.0"}});
        assert_eq!(
            render("{{#scope}}was {{previousVersion}}{{/scope}}", &context).unwrap(),
            "was 0.9.0"
        );
    }

    #[test]
    fn outer_fields_stay_visible_inside_a_section() {
        let context = json!({"version": "1.0.0", "scope": {"previous": "0.9.0"}});
        assert_eq!(
            render("{{#scope}}{{previous}} -> {{version}}{{/scope}}", &context).unwrap(),
            "0.9.0 -> 1.0.0"
        );
    }

    #[test]
    fn false_scalar_section_renders_nothing() {
        let context = json!({"newVersion": false});
        assert_eq!(
            render("{{#newVersion}}release!{{/newVersion}}", &context).unwrap(),
            ""
        );
    }

    #[test]
    fn true_scalar_section_renders_once() {
        let context = json!({"newVersion": true});
        assert_eq!(
            render("{{#newVersion}}release!{{/newVersion}}", &context).unwrap(),
            "release!"
        );
    }

    #[test]
    fn array_section_repeats_per_element() {
        let context = json!({"items": [{"name": "a"}, {"name": "b"}]});
        assert_eq!(
            render("{{#items}}{{name}};{{/items}}", &context).unwrap(),
            "a;b;"
        );
    }

    #[test]
    fn lambda_sections_transform_their_body() {
        let context = json!({"branch": "Feature/Login"});
        assert_eq!(
            render("{{#lower}}{{branch}}{{/lower}}", &context).unwrap(),
            "feature/login"
        );
        assert_eq!(
            render("{{#sanitizeLower}}{{branch}}{{/sanitizeLower}}", &context).unwrap(),
            "featurelogin"
        );
    }

    #[test]
    fn nested_lambdas_compose() {
        let context = json!({"branch": "feature/LOGIN"});
        assert_eq!(
            render(
                "{{#upper}}{{#first}}{{branch}}{{/first}}{{/upper}}",
                &context
            )
            .unwrap(),
            "FEATURE"
        );
    }

    #[test]
    fn timestamp_lambda_formats_the_state_timestamp() {
        let context = json!({"timestamp": 0});
        assert_eq!(
            render(
                "{{#timestampISO8601}}{{timestamp}}{{/timestampISO8601}}",
                &context
            )
            .unwrap(),
            "1970-01-01T00:00:00"
        );
    }

    #[test]
    fn rendering_is_pure_for_the_same_state() {
        let context = json!({"version": "2.0.0", "scope": {"commits": [{"sha": "a"}]}});
        let template = "{{version}}:{{#scope}}{{#commits}}{{sha}}{{/commits}}{{/scope}}";
        let first = render(template, &context).unwrap();
        let second = render(template, &context).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "2.0.0:a");
    }
}
