use rs_siteconfig::{
    Config, DocumentType, Error, Extraction, Identity, Options, PatternRule, Registry, Resolver,
    Rule, RuleContext,
};

fn pattern<F>(id: &str, re: &str, configure: F) -> PatternRule
where
    F: Fn(&mut RuleContext<'_>) -> rs_siteconfig::Result<()> + Send + Sync + 'static,
{
    PatternRule::new(id, re, configure).expect("valid pattern")
}

/// A rule whose predicate always fails.
struct BrokenPredicate;

impl Rule for BrokenPredicate {
    fn id(&self) -> &str {
        "broken-predicate"
    }

    fn is_active(&self, _identity: &Identity) -> rs_siteconfig::Result<bool> {
        Err(Error::rule("cannot decide"))
    }

    fn set_config(&self, ctx: &mut RuleContext<'_>) -> rs_siteconfig::Result<()> {
        ctx.config_mut().set_title_selectors(["never"]);
        Ok(())
    }
}

/// A rule whose predicate panics.
struct PanickingPredicate;

impl Rule for PanickingPredicate {
    fn id(&self) -> &str {
        "panicking-predicate"
    }

    fn is_active(&self, _identity: &Identity) -> rs_siteconfig::Result<bool> {
        panic!("predicate blew up")
    }

    fn set_config(&self, _ctx: &mut RuleContext<'_>) -> rs_siteconfig::Result<()> {
        Ok(())
    }
}

#[test]
fn first_registered_matching_rule_wins() {
    let registry = Registry::new()
        .with(pattern("specific", r"^https://example\.com/news/", |ctx| {
            ctx.config_mut().set_body_selectors(["div.story"]);
            Ok(())
        }))
        .and_then(|r| {
            r.with(pattern("generic", r"^https://example\.com/", |ctx| {
                ctx.config_mut().set_body_selectors(["main"]);
                Ok(())
            }))
        })
        .expect("unique ids");
    let resolver = Resolver::new(registry);

    let news = resolver.resolve("https://example.com/news/1").expect("expected Ok(_)");
    assert_eq!(news.rule.as_ref().map(|id| id.as_str()), Some("specific"));
    assert_eq!(news.config.body_selectors(), ["div.story"]);

    let about = resolver.resolve("https://example.com/about").expect("expected Ok(_)");
    assert_eq!(about.rule.as_ref().map(|id| id.as_str()), Some("generic"));
    assert_eq!(about.config.body_selectors(), ["main"]);
}

#[test]
fn no_match_leaves_state_untouched() {
    let registry = Registry::new()
        .with(pattern("other", r"^https://other\.org/", |ctx| {
            ctx.config_mut().set_title_selectors(["h1"]);
            Ok(())
        }))
        .expect("unique ids");
    let resolver = Resolver::new(registry);

    let mut defaults = Config::new();
    defaults.set_strip_selectors([".cookie-banner"]);
    let extraction = Extraction::new("https://example.com/post")
        .expect("valid url")
        .with_config(defaults.clone());

    let resolution = resolver.resolve_with(extraction).expect("expected Ok(_)");
    assert!(resolution.rule.is_none());
    assert!(resolution.override_rule.is_none());
    assert_eq!(resolution.config, defaults);
    assert!(resolution.warnings.is_empty());
    assert_eq!(resolution.message.title(), "");
    assert!(resolution.message.readability());
}

#[test]
fn rule_sees_caller_defaults_and_replaces_lists_wholesale() {
    let registry = Registry::new()
        .with(pattern("extend", r"example\.com", |ctx| {
            let mut strip = ctx.config().strip_selectors().to_vec();
            strip.push(".newsletter".to_string());
            ctx.config_mut().set_strip_selectors(strip);
            ctx.config_mut().set_title_selectors(["h1.headline"]);
            Ok(())
        }))
        .expect("unique ids");
    let resolver = Resolver::new(registry);

    let mut defaults = Config::new();
    defaults.set_strip_selectors([".ad"]);
    defaults.set_title_selectors(["h1", "title"]);
    let extraction = Extraction::new("https://example.com/").expect("valid url").with_config(defaults);

    let resolution = resolver.resolve_with(extraction).expect("expected Ok(_)");
    assert_eq!(resolution.config.strip_selectors(), [".ad", ".newsletter"]);
    assert_eq!(resolution.config.title_selectors(), ["h1.headline"]);
}

#[test]
fn rule_edits_message_fields() {
    let registry = Registry::new()
        .with(pattern("video-site", r"^https://videos\.example/", |ctx| {
            let message = ctx.message_mut();
            message.set_title("A talk");
            message.set_site("Example Videos");
            message.set_authors(["Ada", "Grace"]);
            message.set_type("video")?;
            message.set_html("<iframe src=\"https://videos.example/embed/1\"></iframe>");
            message.set_readability(false);
            Ok(())
        }))
        .expect("unique ids");

    let resolution = Resolver::new(registry)
        .resolve("https://videos.example/watch/1")
        .expect("expected Ok(_)");
    let message = &resolution.message;
    assert_eq!(message.title(), "A talk");
    assert_eq!(message.site(), "Example Videos");
    assert_eq!(message.authors(), ["Ada", "Grace"]);
    assert_eq!(message.document_type(), DocumentType::Video);
    assert!(!message.readability());
    assert!(message.html().is_some_and(|html| html.contains("iframe")));
    assert_eq!(message.domain(), "videos.example");
}

#[test]
fn invalid_document_type_is_a_warning_and_earlier_edits_survive() {
    let registry = Registry::new()
        .with(pattern("bad-type", r"example\.com", |ctx| {
            ctx.message_mut().set_title("kept");
            ctx.message_mut().set_type("podcast")?;
            ctx.message_mut().set_title("never reached");
            Ok(())
        }))
        .expect("unique ids");

    let resolution = Resolver::new(registry).resolve("https://example.com/").expect("expected Ok(_)");
    assert_eq!(resolution.message.title(), "kept");
    assert_eq!(resolution.message.document_type(), DocumentType::Article);
    assert_eq!(resolution.warnings.len(), 1);
    assert!(resolution.warnings[0].contains("podcast"));
}

#[test]
fn failing_mutator_keeps_partial_configuration() {
    let registry = Registry::new()
        .with(pattern("half-done", r"example\.com", |ctx| {
            ctx.config_mut().set_body_selectors(["article"]);
            Err(rs_siteconfig::Error::rule("gave up"))
        }))
        .expect("unique ids");

    let resolution = Resolver::new(registry).resolve("https://example.com/").expect("expected Ok(_)");
    assert_eq!(resolution.rule.as_ref().map(|id| id.as_str()), Some("half-done"));
    assert_eq!(resolution.config.body_selectors(), ["article"]);
    assert_eq!(resolution.warnings.len(), 1);
    assert!(resolution.warnings[0].contains("half-done"));
    assert!(resolution.warnings[0].contains("gave up"));
}

#[test]
fn panicking_mutator_is_isolated() {
    let registry = Registry::new()
        .with(pattern("panics", r"example\.com", |ctx| {
            ctx.config_mut().set_date_selectors(["time"]);
            panic!("rule bug");
        }))
        .expect("unique ids");
    let resolver = Resolver::new(registry);

    let resolution = resolver.resolve("https://example.com/").expect("expected Ok(_)");
    assert_eq!(resolution.config.date_selectors(), ["time"]);
    assert!(resolution.warnings[0].contains("rule bug"));

    // The resolver stays usable after a panic.
    assert!(resolver.resolve("https://example.com/again").is_ok());
}

#[test]
fn predicate_error_stops_matching_by_default() {
    let mut registry = Registry::new();
    registry.register(BrokenPredicate).expect("unique id");
    registry
        .register(pattern("fallback", r".*", |ctx| {
            ctx.config_mut().set_body_selectors(["body"]);
            Ok(())
        }))
        .expect("unique id");

    let resolution = Resolver::new(registry).resolve("https://example.com/").expect("expected Ok(_)");
    assert!(resolution.rule.is_none());
    assert!(resolution.config.is_empty());
    assert_eq!(resolution.warnings.len(), 1);
    assert!(resolution.warnings[0].contains("broken-predicate"));
}

#[test]
fn predicate_errors_can_be_skipped() {
    let mut registry = Registry::new();
    registry.register(BrokenPredicate).expect("unique id");
    registry.register(PanickingPredicate).expect("unique id");
    registry
        .register(pattern("fallback", r".*", |ctx| {
            ctx.config_mut().set_body_selectors(["body"]);
            Ok(())
        }))
        .expect("unique id");

    let options = Options {
        continue_after_match_error: true,
        ..Options::default()
    };
    let resolution = Resolver::with_options(registry, options)
        .resolve("https://example.com/")
        .expect("expected Ok(_)");
    assert_eq!(resolution.rule.as_ref().map(|id| id.as_str()), Some("fallback"));
    assert_eq!(resolution.config.body_selectors(), ["body"]);
    assert_eq!(resolution.warnings.len(), 2);
    assert!(resolution.warnings[1].contains("predicate blew up"));
}

#[test]
fn matching_sees_the_literal_url() {
    let registry = Registry::new()
        .with(pattern("www-only", r"^https://www\.example\.com/", |_| Ok(())))
        .expect("unique ids");
    let resolver = Resolver::new(registry);

    let www = Identity::parse("https://www.example.com/a").expect("valid url");
    let bare = Identity::parse("https://example.com/a").expect("valid url");
    assert_eq!(www.domain(), bare.domain());
    assert!(resolver.matching_rule(&www).is_some());
    assert!(resolver.matching_rule(&bare).is_none());
}

#[test]
fn invalid_url_is_rejected_before_matching() {
    let resolver = Resolver::new(Registry::new());
    assert!(matches!(resolver.resolve("not a url"), Err(Error::InvalidUrl { .. })));
    assert!(matches!(resolver.resolve("mailto:someone@example.com"), Err(Error::InvalidUrl { .. })));
}

#[test]
fn resolve_in_place_keeps_document_and_properties() {
    let registry = Registry::new()
        .with(pattern("reads-document", r"example\.com", |ctx| {
            let heading = ctx
                .document()
                .and_then(|doc| rs_siteconfig::dom::query_selector(&doc.select("body"), "h1"))
                .map(|h1| rs_siteconfig::dom::text_content(&h1));
            if let Some(heading) = heading {
                ctx.message_mut().set_title(heading);
            }
            let captured = ctx
                .message()
                .property("captured_at")
                .and_then(|v| v.as_str())
                .map(ToString::to_string);
            if let Some(captured) = captured {
                ctx.message_mut().set_meta("captured_at", [captured]);
            }
            Ok(())
        }))
        .expect("unique ids");

    let mut properties = serde_json::Map::new();
    properties.insert("captured_at".to_string(), serde_json::json!("2024-01-01"));
    let mut extraction = Extraction::new("https://example.com/")
        .expect("valid url")
        .with_properties(properties)
        .with_html("<html><body><h1>Headline</h1></body></html>");

    let outcome = Resolver::new(registry)
        .resolve_in_place(&mut extraction)
        .expect("expected Ok(_)");
    assert_eq!(outcome.rule.as_ref().map(|id| id.as_str()), Some("reads-document"));
    assert_eq!(extraction.message().title(), "Headline");
    assert_eq!(
        extraction.message().meta("captured_at"),
        Some(&["2024-01-01".to_string()][..])
    );
    assert!(extraction.document().is_some());
}

#[test]
fn resolution_serializes_to_json() {
    let registry = Registry::new()
        .with(pattern("json", r"example\.com", |ctx| {
            ctx.config_mut().set_body_selectors(["article"]);
            Ok(())
        }))
        .expect("unique ids");
    let resolution = Resolver::new(registry).resolve("https://www.example.com/").expect("expected Ok(_)");

    let value = serde_json::to_value(&resolution).expect("serializable");
    assert_eq!(value["rule"], "json");
    assert_eq!(value["config"]["bodySelectors"][0], "article");
    assert_eq!(value["message"]["domain"], "example.com");
    assert_eq!(value["message"]["type"], "article");
}
