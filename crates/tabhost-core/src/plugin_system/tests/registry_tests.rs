#![cfg(test)]

use crate::plugin_system::descriptor::{DescriptorBuilder, Origin, PluginDescriptor};
use crate::plugin_system::error::{ErrorKind, PluginSystemError};
use crate::plugin_system::platform::Platform;
use crate::plugin_system::traits::PluginError;
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::tests::support::linux_validator;
use crate::plugin_system::validator::{ValidationResult, ValidationStatus};
use crate::storage::config::DiscoverySettings;

fn described(name: &str, origin: Origin, source: &str) -> PluginDescriptor {
    DescriptorBuilder::new(name).origin(origin).source(source).build()
}

fn validated(descriptor: &PluginDescriptor) -> ValidationResult {
    linux_validator().validate(descriptor)
}

fn registry() -> PluginRegistry {
    PluginRegistry::new(Some(Platform::Linux))
}

#[test]
fn test_unique_names_keep_insertion_order() {
    let mut registry = registry();
    for (name, source) in [("Core", "core:Core"), ("Alpha", "/p/a.so"), ("Beta", "/p/b.so")] {
        registry.register(validated(&described(name, Origin::Local, source)));
    }

    let view = registry.into_view();
    assert_eq!(view.names(), vec!["Core", "Alpha", "Beta"]);
    assert_eq!(view.active().len(), 3);
    assert_eq!(view.diagnostics().len(), 3);
    assert!(view.overrides().is_empty());
}

#[test]
fn test_higher_origin_overrides_and_takes_position() {
    let mut registry = registry();
    let entry_point = described("Beta", Origin::EntryPoint, "netkit:beta");
    let local = described("Beta", Origin::Local, "/p/beta.so");

    registry.register(validated(&entry_point));
    registry.register(validated(&described("Gamma", Origin::EntryPoint, "netkit:gamma")));
    registry.register(validated(&local));

    let view = registry.into_view();
    assert_eq!(view.names(), vec!["Beta", "Gamma"]);
    let beta = view.get("Beta").unwrap();
    assert_eq!(beta.descriptor, local);
    assert_eq!(beta.descriptor.origin, Origin::Local);

    let loser = &view.diagnostics()["netkit:beta"];
    assert_eq!(loser.messages, vec!["overridden by /p/beta.so".to_string()]);
    assert!(view.diagnostics()["/p/beta.so"].messages.is_empty());

    let record = &view.overrides()[0];
    assert_eq!(record.kind(), ErrorKind::CollisionOverride);
    assert_eq!(record.winner_source, "/p/beta.so");
    assert_eq!(record.loser_origin, Origin::EntryPoint);
}

#[test]
fn test_lower_origin_never_shadows() {
    let mut registry = registry();
    let local = described("Beta", Origin::Local, "/p/beta.so");
    registry.register(validated(&local));
    registry.register(validated(&described("Beta", Origin::Core, "core:Beta")));

    let view = registry.into_view();
    assert_eq!(view.all().len(), 1);
    assert_eq!(view.get("Beta").unwrap().descriptor, local);
    assert_eq!(
        view.diagnostics()["core:Beta"].messages,
        vec!["overridden by /p/beta.so".to_string()]
    );
}

#[test]
fn test_same_origin_later_wins() {
    let mut registry = registry();
    registry.register(validated(&described("Beta", Origin::Local, "/p/a_beta.so")));
    let later = described("Beta", Origin::Local, "/p/b_beta.so");
    registry.register(validated(&later));

    let view = registry.into_view();
    assert_eq!(view.get("Beta").unwrap().descriptor, later);
    assert_eq!(view.overrides().len(), 1);
}

#[test]
fn test_repeated_source_keeps_both_outcomes() {
    let mut registry = registry();
    let first = described("Dup", Origin::Core, "core:Dup");
    let second = described("Dup", Origin::Core, "core:Dup");
    registry.register(validated(&first));
    registry.register(validated(&second));

    let view = registry.into_view();
    assert_eq!(view.diagnostics().len(), 2);
    let winner = view.get("Dup").unwrap();
    assert!(winner.descriptor.same_factory(&second));
    assert_eq!(winner.descriptor.source_identifier, "core:Dup#2");
    assert!(view.diagnostics()["core:Dup#2"].messages.is_empty());
    assert_eq!(
        view.diagnostics()["core:Dup"].messages,
        vec!["overridden by core:Dup#2".to_string()]
    );
    assert_eq!(view.overrides()[0].loser_source, "core:Dup");
}

#[test]
fn test_failing_registration_never_displaces_valid_one() {
    let mut registry = registry();
    let packaged = described("Beta", Origin::EntryPoint, "netkit:beta");
    let broken_local = DescriptorBuilder::new("Beta")
        .origin(Origin::Local)
        .source("/p/beta.so")
        .factory(|| Err(PluginError::WidgetError("no device".to_string())))
        .build();

    registry.register(validated(&packaged));
    registry.register(validated(&broken_local));

    let view = registry.into_view();
    let active: Vec<&str> = view.active().iter().map(|e| e.name()).collect();
    assert_eq!(active, vec!["Beta"]);
    assert_eq!(view.get("Beta").unwrap().descriptor, packaged);

    let loser = &view.diagnostics()["/p/beta.so"];
    assert_eq!(loser.status, ValidationStatus::FactoryError);
    assert_eq!(loser.messages.last().unwrap(), "overridden by netkit:beta");
    let record = &view.overrides()[0];
    assert_eq!(record.winner_origin, Origin::EntryPoint);
    assert_eq!(record.loser_origin, Origin::Local);
}

#[test]
fn test_valid_registration_replaces_failing_one() {
    let mut registry = registry();
    let windows_only = DescriptorBuilder::new("Beta")
        .platforms(&["Windows"])
        .origin(Origin::Local)
        .source("/p/beta.so")
        .build();
    let core = described("Beta", Origin::Core, "core:Beta");

    registry.register(validated(&windows_only));
    registry.register(validated(&core));

    let view = registry.into_view();
    assert_eq!(view.get("Beta").unwrap().descriptor, core);
    assert!(view.is_enabled("Beta"));
    assert_eq!(
        view.diagnostics()["/p/beta.so"].messages.last().unwrap(),
        "overridden by core:Beta"
    );
}

#[test]
fn test_failures_are_diagnostics_only() {
    let mut registry = registry();
    let error = PluginSystemError::load("/p/b.so", "not a library");
    registry.register(ValidationResult::failure(Origin::Local, "/p/b.so", &error));
    registry.register(validated(&described("", Origin::Local, "/p/empty.so")));

    let view = registry.into_view();
    assert!(view.all().is_empty());
    assert_eq!(view.diagnostics().len(), 2);
    assert_eq!(view.failures().count(), 2);
    assert_eq!(view.diagnostics()["/p/b.so"].status, ValidationStatus::Invalid);
}

#[test]
fn test_incompatible_entries_are_kept_but_inactive() {
    let mut registry = registry();
    let windows_only = DescriptorBuilder::new("WinOnly")
        .platforms(&["Windows"])
        .origin(Origin::Local)
        .build();
    registry.register(validated(&windows_only));
    registry.register(validated(&described("Alpha", Origin::Local, "/p/a.so")));

    let view = registry.into_view();
    assert_eq!(view.all().len(), 2);
    assert_eq!(view.names(), vec!["WinOnly", "Alpha"]);
    let active: Vec<&str> = view.active().iter().map(|e| e.name()).collect();
    assert_eq!(active, vec!["Alpha"]);
    assert_eq!(view.get("WinOnly").unwrap().status(), ValidationStatus::IncompatiblePlatform);
}

#[test]
fn test_enabled_overlay() {
    let mut settings = DiscoverySettings::default();
    settings.disabled.insert("Alpha".to_string());
    settings.enabled.insert("Lazy".to_string());

    let mut registry = registry().with_settings(settings);
    registry.register(validated(&described("Alpha", Origin::Local, "/p/a.so")));
    registry.register(validated(&described("Beta", Origin::Core, "core:Beta")));
    for (name, source) in [("Lazy", "/p/lazy.so"), ("Sleepy", "/p/sleepy.so")] {
        let descriptor = DescriptorBuilder::new(name)
            .origin(Origin::Local)
            .source(source)
            .disabled_by_default(true)
            .build();
        registry.register(validated(&descriptor));
    }

    let view = registry.into_view();
    assert!(!view.is_enabled("Alpha"));
    assert!(view.is_enabled("Beta"));
    assert!(view.is_enabled("Lazy"));
    assert!(!view.is_enabled("Sleepy"));
    assert!(!view.is_enabled("Missing"));
    let enabled: Vec<&str> = view.enabled().iter().map(|e| e.name()).collect();
    assert_eq!(enabled, vec!["Beta", "Lazy"]);
    assert_eq!(view.core().len(), 1);
    assert_eq!(view.external().len(), 3);
}

#[test]
fn test_summary_counts_and_serializes() {
    let mut registry = registry();
    registry.register(validated(&described("Core", Origin::Core, "core:Core")));
    registry.register(validated(&described("Alpha", Origin::Local, "/p/a.so")));
    let error = PluginSystemError::load("/p/b.so", "not a library");
    registry.register(ValidationResult::failure(Origin::Local, "/p/b.so", &error));

    let summary = registry.into_view().summary();
    assert_eq!(summary.platform, "Linux");
    assert_eq!(summary.total, 2);
    assert_eq!(summary.active, 2);
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.by_origin[&Origin::Local], 1);
    assert_eq!(summary.by_status[&ValidationStatus::Valid], 2);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["by_origin"]["core"], 1);
    assert_eq!(json["plugins"][1]["name"], "Alpha");
    assert_eq!(json["plugins"][1]["status"], "valid");
    assert_eq!(json["plugins"][1]["enabled"], true);
}
