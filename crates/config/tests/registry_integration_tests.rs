use std::sync::Arc;
use std::thread;

use scheduler_config::catalog::{self, DEFAULT_GROUP_NAME, METRICS_GROUP_NAME};
use scheduler_config::{
    ConfigError, OptionDescriptor, OptionGroup, OptionValue, Registry, DEFAULT_GROUP,
};

fn bool_flag(default: bool) -> OptionDescriptor {
    OptionDescriptor::boolean("use_baremetal")
        .default_value(default)
        .help("Toggle baremetal filtering")
        .build()
        .unwrap()
}

#[test]
fn test_retry_limit_scenario() {
    let registry = Registry::new();
    let retry_limit = OptionDescriptor::integer("retry_limit")
        .default_value(3)
        .min(1)
        .build()
        .unwrap();
    registry.register_opts([retry_limit], DEFAULT_GROUP).unwrap();

    let resolved = registry.resolve(DEFAULT_GROUP, "retry_limit").unwrap();
    assert_eq!(resolved.default_value(), Some(&OptionValue::Integer(3)));
}

#[test]
fn test_min_bound_rejects_zero_default() {
    let result = OptionDescriptor::integer("retry_limit")
        .default_value(0)
        .min(1)
        .build();
    assert!(matches!(result, Err(ConfigError::ConstraintViolation { .. })));
}

#[test]
fn test_enabled_filters_listing() {
    let registry = Registry::new();
    let filters = OptionDescriptor::list("enabled_filters")
        .default_value(vec!["A", "B"])
        .build()
        .unwrap();
    registry.register_default_opts([filters]).unwrap();

    let catalog = registry.list_opts();
    let default_group = catalog.get(DEFAULT_GROUP).unwrap();
    assert_eq!(default_group.len(), 1);
    assert_eq!(
        default_group[0].default_value().and_then(OptionValue::as_list),
        Some(&["A".to_string(), "B".to_string()][..])
    );
}

#[test]
fn test_boolean_idempotence_then_conflict() {
    let registry = Registry::new();
    registry.register_default_opts([bool_flag(false)]).unwrap();
    registry.register_default_opts([bool_flag(false)]).unwrap();
    assert_eq!(registry.option_count(), 1);

    let err = registry.register_default_opts([bool_flag(true)]).unwrap_err();
    assert_eq!(
        err,
        ConfigError::duplicate_option(DEFAULT_GROUP, "use_baremetal")
    );
    assert_eq!(
        registry
            .resolve(DEFAULT_GROUP, "use_baremetal")
            .unwrap()
            .default_value(),
        Some(&OptionValue::Boolean(false))
    );
}

#[test]
fn test_kind_change_is_rejected() {
    let registry = Registry::new();
    registry.register_default_opts([bool_flag(false)]).unwrap();

    let as_string = OptionDescriptor::string("use_baremetal")
        .default_value("false")
        .help("Toggle baremetal filtering")
        .build()
        .unwrap();
    assert!(matches!(
        registry.register_default_opts([as_string]),
        Err(ConfigError::DuplicateOption { .. })
    ));
}

#[test]
fn test_list_opts_is_deterministic() {
    let registry = Registry::new();
    catalog::register_opts(&registry).unwrap();

    let first = registry.list_opts();
    let second = registry.list_opts();
    assert_eq!(first, second);
    assert_eq!(
        first.export(scheduler_config::ExportFormat::Json).unwrap(),
        second.export(scheduler_config::ExportFormat::Json).unwrap()
    );
}

#[test]
fn test_list_opts_group_set_matches_registrations() {
    let registry = Registry::new();
    registry
        .register_group(OptionGroup::new("empty_but_declared").with_title("Declared"))
        .unwrap();
    registry.register_opt(bool_flag(true), "lazy").unwrap();
    registry.register_opts(Vec::new(), "never_used").unwrap();

    let catalog = registry.list_opts();
    assert_eq!(catalog.group_names(), vec!["empty_but_declared", "lazy"]);
    assert_eq!(catalog.get("empty_but_declared").map(|opts| opts.len()), Some(0));
    assert_eq!(catalog.group("empty_but_declared").unwrap().title, "Declared");
}

#[test]
fn test_registration_order_tolerance() {
    let title_first = Registry::new();
    title_first
        .register_group(OptionGroup::new("trusted_computing").with_title("Trust parameters"))
        .unwrap();
    title_first.register_opt(bool_flag(true), "trusted_computing").unwrap();

    let opts_first = Registry::new();
    opts_first.register_opt(bool_flag(true), "trusted_computing").unwrap();
    opts_first
        .register_group(OptionGroup::new("trusted_computing").with_title("Trust parameters"))
        .unwrap();

    assert_eq!(title_first.list_opts(), opts_first.list_opts());
}

#[test]
fn test_every_registered_default_satisfies_constraints() {
    let registry = Registry::new();
    catalog::register_opts(&registry).unwrap();

    for (group, options) in registry.list_opts().iter() {
        for opt in options {
            if let Some(default) = opt.default_value() {
                let rebuilt = OptionDescriptor::new(
                    opt.name(),
                    opt.kind(),
                    Some(default.clone()),
                    opt.constraints().clone(),
                    opt.help(),
                );
                assert!(rebuilt.is_ok(), "{group}.{} failed revalidation", opt.name());
            }
        }
    }
}

#[test]
fn test_concurrent_registration_from_independent_subsystems() {
    let registry = Arc::new(Registry::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || catalog::register_opts(&registry))
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(registry.group_count(), 4);
    assert_eq!(registry.option_count(), 37);
    assert_eq!(registry.list_opts(), catalog::list_opts().unwrap());
}

#[test]
fn test_lookup_errors_surface_immediately() {
    let registry = Registry::new();
    catalog::register_opts(&registry).unwrap();

    assert_eq!(
        registry.resolve("no_such_group", "x").unwrap_err(),
        ConfigError::group_not_found("no_such_group")
    );
    assert_eq!(
        registry.resolve(METRICS_GROUP_NAME, "weight").unwrap_err(),
        ConfigError::option_not_found(METRICS_GROUP_NAME, "weight")
    );
    assert!(registry.resolve(DEFAULT_GROUP_NAME, "scheduler_topic").is_ok());
}
