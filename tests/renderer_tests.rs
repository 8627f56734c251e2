mod utils;

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::collections::HashMap;
    use template_sandbox::{
        constants::INLINE_ERROR_PREFIX, config::RenderConfig, Error, FormatProvider,
        HostingMode, RenderInput, SandboxedTemplate, TemplateEngine,
    };
    use test_log::test;

    use crate::utils::{sample_order, Customer};

    fn template(source: &str, hosting: HostingMode) -> SandboxedTemplate {
        TemplateEngine::new().parse("test.txt", source, &hosting).unwrap()
    }

    fn en() -> FormatProvider {
        FormatProvider::for_tag("en-US").unwrap()
    }

    #[test]
    fn renders_mapping_input() {
        let tmpl = template("Hello {{name}}", HostingMode::Standalone);
        let mut data = HashMap::new();
        data.insert("name".to_string(), "Ada");
        assert_eq!(tmpl.render(RenderInput::mapping(&data), &en()).unwrap(), "Hello Ada");
    }

    #[test]
    fn renders_json_input() {
        let tmpl = template("Hello {{name}}", HostingMode::Standalone);
        assert_eq!(tmpl.render(&json!({"name": "Ada"}), &en()).unwrap(), "Hello Ada");
    }

    #[test]
    fn renders_nested_object_members() {
        struct Envelope {
            customer: Customer,
        }
        template_sandbox::expose!(Envelope { customer });

        let data = Envelope { customer: Customer::new("Bo") };
        let tmpl = template("Hi {{customer.name}}", HostingMode::Standalone);
        assert_eq!(tmpl.render(RenderInput::object(&data), &en()).unwrap(), "Hi Bo");
    }

    #[test]
    fn unexposed_members_are_unreachable() {
        let order = sample_order();
        for source in [
            "{{ customer.password_hash }}",
            "{{ customer.deleted }}",
            "{{ customer.delete() }}",
            "{{ connection }}",
        ] {
            let tmpl = template(source, HostingMode::Standalone);
            let result = tmpl.render(RenderInput::object(&order), &en());
            assert!(matches!(result, Err(Error::EvaluatorFault(_))), "{source} rendered");
        }
        assert!(!order.customer.deleted.get());
    }

    #[test]
    fn records_enumerate_only_exposed_members() {
        let order = sample_order();
        let tmpl = template(
            "{% for key in customer %}{{ key }};{% endfor %}",
            HostingMode::Standalone,
        );
        let out = tmpl.render(RenderInput::object(&order), &en()).unwrap();
        assert_eq!(out, "name;email;address;");
    }

    #[test]
    fn renders_an_order_confirmation() {
        let order = sample_order();
        let source = "Order {{ number }} placed {{ created_at | format_date('%d.%m.%Y') }}\n\
            {% for line in lines %}{{ line.quantity }} x {{ line.sku }} @ {{ line.price | format_number }}\n{% endfor %}\
            Total: {{ total | format_number }}";
        let tmpl = template(source, HostingMode::Standalone);
        let de = FormatProvider::for_tag("de-DE").unwrap();
        let out = tmpl.render(RenderInput::object(&order), &de).unwrap();
        assert_eq!(
            out,
            "Order SO-1001 placed 09.03.2024\n\
             2 x MUG-1 @ 7,50\n\
             1 x TEE-3 @ 1.200,00\n\
             Total: 1.215,00"
        );
    }

    #[test]
    fn undefined_variable_is_rendered_inline_when_hosted() {
        let tmpl = template("Dear {{ customer.name }}, {{ coupon }}", HostingMode::Hosted);
        let order = sample_order();
        let out = tmpl.render(RenderInput::object(&order), &en()).unwrap();
        assert!(out.starts_with("Dear Bo, "));
        assert!(out.contains(INLINE_ERROR_PREFIX));
        assert!(out.contains("undefined"));
    }

    #[test]
    fn undefined_variable_is_raised_when_standalone() {
        let tmpl = template("Dear {{ customer.name }}, {{ coupon }}", HostingMode::Standalone);
        let order = sample_order();
        let err = tmpl.render(RenderInput::object(&order), &en()).unwrap_err();
        assert!(matches!(err, Error::EvaluatorFault(_)));
    }

    const HOSTILE_FILTER_CALLS: [&str; 5] = [
        "{{ total | format_number(70000) }}",
        "{{ total | format_number(-3) }}",
        "{{ number | format_number }}",
        "{{ created_at | format_date('%Y-%') }}",
        "{{ number | format_date }}",
    ];

    #[test]
    fn hostile_filter_arguments_are_raised_when_standalone() {
        let order = sample_order();
        for call in HOSTILE_FILTER_CALLS {
            let tmpl = template(call, HostingMode::Standalone);
            let result = tmpl.render(RenderInput::object(&order), &en());
            assert!(matches!(result, Err(Error::EvaluatorFault(_))), "{call} rendered");
        }
    }

    #[test]
    fn hostile_filter_arguments_are_rendered_inline_when_hosted() {
        let order = sample_order();
        for call in HOSTILE_FILTER_CALLS {
            let tmpl = template(&format!("Order {{{{ number }}}}: {call}"), HostingMode::Hosted);
            let out = tmpl.render(RenderInput::object(&order), &en()).unwrap();
            assert!(
                out.starts_with(&format!("Order SO-1001: {INLINE_ERROR_PREFIX}")),
                "{call} rendered {out:?}"
            );
        }
    }

    #[test]
    fn missing_data_is_an_invalid_argument() {
        let tmpl = template("x", HostingMode::Hosted);
        let err = tmpl.render(RenderInput::Missing, &en()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "data", .. }));
    }

    #[test]
    fn malformed_locale_is_an_invalid_argument() {
        let err = FormatProvider::for_tag("").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "format_provider", .. }));
    }

    #[test]
    fn html_templates_escape_values() {
        let tmpl = TemplateEngine::new()
            .parse("mail.html", "<p>{{ name }}</p>", &HostingMode::Standalone)
            .unwrap();
        let out = tmpl.render(&json!({"name": "<script>"}), &en()).unwrap();
        assert_eq!(out, "<p>&lt;script&gt;</p>");
    }

    #[test]
    fn fuel_limit_stops_runaway_templates() {
        let config = RenderConfig { fuel: Some(100), ..Default::default() };
        let tmpl = TemplateEngine::from_config(&config)
            .parse(
                "loop.txt",
                "{% for i in range(10000) %}{{ i }}{% endfor %}",
                &HostingMode::Standalone,
            )
            .unwrap();
        assert!(matches!(tmpl.render(&json!({}), &en()), Err(Error::EvaluatorFault(_))));
    }

    #[test]
    fn concurrent_renders_match_sequential_ones() {
        let tmpl = template(
            "{{ name }}: {{ total | format_number }} ({{ locale }})",
            HostingMode::Standalone,
        );
        let locales = ["en-US", "de-DE", "fr-FR", "ja-JP"];
        let inputs: Vec<(serde_json::Value, FormatProvider)> = (0..32)
            .map(|i| {
                let data = json!({"name": format!("customer-{i}"), "total": i as f64 * 1000.25});
                (data, FormatProvider::for_tag(locales[i % locales.len()]).unwrap())
            })
            .collect();

        let sequential: Vec<String> =
            inputs.iter().map(|(data, fp)| tmpl.render(data, fp).unwrap()).collect();

        let shared = &tmpl;
        let concurrent: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|(data, fp)| scope.spawn(move || shared.render(data, fp).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(sequential, concurrent);
    }
}
