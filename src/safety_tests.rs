//! Safety Gate Tests
//!
//! These tests verify that a compile pass survives hostile input:
//! - malformed directive names and empty modifiers never panic
//! - markup injection accepts arbitrary strings
//! - re-entrant writes from bindings and handlers terminate
//! - replaced nodes release what they held

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::compiler::Compiler;
    use crate::diagnostics::{DIAG_MARKUP_FALLBACK, DIAG_MISSING_EVENT_NAME};
    use crate::dom::{Event, Node};
    use crate::methods::MethodTable;
    use crate::options::CompileOptions;
    use crate::parse::parse_template;
    use crate::store::{Model, ReactiveStore};

    fn compiler(model: &Rc<Model>) -> Compiler {
        Compiler::new(model.clone(), MethodTable::new())
    }

    #[test]
    fn test_malformed_directive_names_do_not_panic() {
        let model = Rc::new(Model::new().with("x", "1"));
        let root = Node::element("div").with_child(
            Node::element("span")
                .with_attribute("v-", "x")
                .with_attribute("v-:", "x")
                .with_attribute("v-on", "x")
                .with_attribute("v-on:", "x")
                .with_attribute("v-on:a:b:c", "x")
                .with_attribute("v-text:extra", "x"),
        );
        let report = compiler(&model).compile(&root).unwrap();

        // `v-text:extra` still resolves to the text directive.
        assert_eq!(report.bindings, 1);
        assert_eq!(root.text_content(), "1");
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.code == DIAG_MISSING_EVENT_NAME));
    }

    #[test]
    fn test_empty_key_binds_to_empty_value() {
        let model = Rc::new(Model::new());
        let root = parse_template("<div><p v-text=\"\">x</p></div>").unwrap();
        compiler(&model).compile(&root).unwrap();
        assert_eq!(root.text_content(), "");
    }

    #[test]
    fn test_markup_injection_accepts_arbitrary_input() {
        let inputs = [
            "",
            "plain",
            "<",
            "</div>",
            "<b><i>unbalanced",
            "<script>x</script>",
            "&amp;&",
        ];
        for markup in inputs {
            let model = Rc::new(Model::new().with("m", markup));
            let root = parse_template("<div><p v-html=\"m\"></p></div>").unwrap();
            let report = compiler(&model).compile(&root).unwrap();
            assert_eq!(report.bindings, 1, "markup {:?}", markup);
            assert_eq!(root.children().len(), 1);
            assert_eq!(root.children()[0].attribute("class").as_deref(), Some("child"));
        }
    }

    #[test]
    fn test_markup_without_wrapper_falls_back_to_text() {
        let model = Rc::new(Model::new().with("m", "<b>a</b><b>b</b>"));
        let root = parse_template("<div><p v-html=\"m\"></p></div>").unwrap();
        let options = CompileOptions {
            markup_wrapper: None,
            ..CompileOptions::default()
        };
        let report = compiler(&model).with_options(options).compile(&root).unwrap();

        assert_eq!(report.diagnostics[0].code, DIAG_MARKUP_FALLBACK);
        let only = &root.children()[0];
        assert!(only.is_text());
        assert_eq!(only.payload().as_deref(), Some("<b>a</b><b>b</b>"));
    }

    #[test]
    fn test_directives_after_markup_replacement_are_not_dispatched() {
        let model = Rc::new(Model::new().with("bio", "<i>x</i>").with("msg", "m"));
        let root = parse_template(concat!(
            "<div><p v-text=\"msg\" v-html=\"bio\" v-model=\"msg\">",
            "<span>{{ msg }}</span></p></div>",
        ))
        .unwrap();
        let report = compiler(&model).compile(&root).unwrap();

        assert_eq!(report.bindings, 2);
        assert_eq!(report.interpolations, 0);
        // The text binding made before the replacement was released with the node.
        assert_eq!(model.subscriber_count("msg"), 0);
        assert_eq!(root.inner_html(), "<div class=\"child\"><i>x</i></div>");
    }

    #[test]
    fn test_handler_writing_bound_key_terminates() {
        let model = Rc::new(Model::new().with("v", "a"));
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let methods = MethodTable::new().with_method("echo", move |model, _| {
            counter.set(counter.get() + 1);
            let current = model.get("v").unwrap_or(Value::Null);
            model.set("v", current);
        });
        let root = parse_template("<div><input v-model=\"v\" v-on:input=\"echo\"></div>").unwrap();
        Compiler::new(model.clone(), methods).compile(&root).unwrap();

        let input = root.children()[0].clone();
        input.set_value("b");
        assert_eq!(input.dispatch_event(&Event::new("input")), 2);
        assert_eq!(calls.get(), 1);
        assert_eq!(model.get("v"), Some(json!("b")));
        assert_eq!(input.value(), "b");
    }

    #[test]
    fn test_callback_chain_between_keys_terminates() {
        let model = Rc::new(Model::new().with("a", "").with("b", ""));
        let root = parse_template(
            "<div><input v-model=\"a\"><p>{{ a }}</p><input v-model=\"b\"><p>{{ b }}</p></div>",
        )
        .unwrap();
        compiler(&model).compile(&root).unwrap();

        // Mirror a into b and b into a from outside the compiler.
        let weak = Rc::downgrade(&model);
        model.subscribe(
            "a",
            Rc::new(move |v: &Value| {
                if let Some(m) = weak.upgrade() {
                    m.set("b", v.clone());
                }
            }),
        );
        let weak = Rc::downgrade(&model);
        model.subscribe(
            "b",
            Rc::new(move |v: &Value| {
                if let Some(m) = weak.upgrade() {
                    m.set("a", v.clone());
                }
            }),
        );

        let first = root.children()[0].clone();
        first.set_value("sync");
        first.dispatch_event(&Event::new("input"));
        assert_eq!(root.text_content(), "syncsync");
    }

    #[test]
    fn test_dropped_tree_releases_its_subscriptions() {
        let model = Rc::new(Model::new().with("n", "1"));
        {
            let root = parse_template("<div><p>{{ n }}</p><i v-text=\"n\"></i></div>").unwrap();
            compiler(&model).compile(&root).unwrap();
            assert_eq!(model.subscriber_count("n"), 2);
        }
        assert_eq!(model.subscriber_count("n"), 0);
        model.set("n", json!("2"));
    }

    #[test]
    fn test_observer_rewriting_key_keeps_view_in_sync() {
        let model = Rc::new(Model::new().with("name", ""));
        let weak = Rc::downgrade(&model);
        model.subscribe(
            "name",
            Rc::new(move |v: &Value| {
                if let (Some(m), Some(s)) = (weak.upgrade(), v.as_str()) {
                    m.set("name", json!(s.to_uppercase()));
                }
            }),
        );
        let root = parse_template("<div><input v-model=\"name\"><p v-text=\"name\"></p></div>")
            .unwrap();
        compiler(&model).compile(&root).unwrap();

        let input = root.children()[0].clone();
        input.set_value("ada");
        input.dispatch_event(&Event::new("input"));

        assert_eq!(model.get("name"), Some(json!("ADA")));
        assert_eq!(input.value(), "ADA");
        assert_eq!(root.children()[1].text_content(), "ADA");
    }

    #[test]
    fn test_value_containing_delimiters_does_not_compound() {
        let model = Rc::new(Model::new().with("a", "{{ a }}"));
        let root = parse_template("<div>[{{ a }}]</div>").unwrap();
        compiler(&model).compile(&root).unwrap();
        assert_eq!(root.text_content(), "[{{ a }}]");

        model.set("a", json!("x"));
        assert_eq!(root.text_content(), "[x]");
    }
}
