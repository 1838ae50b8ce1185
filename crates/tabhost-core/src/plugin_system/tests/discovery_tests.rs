#![cfg(test)]

use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;

use crate::kernel::constants::ENTRY_POINT_NAMESPACE;
use crate::plugin_system::descriptor::Origin;
use crate::plugin_system::discovery::{Discovery, DiscoveryHandle};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::package_index::StaticPackageIndex;
use crate::plugin_system::registry::RegistryView;
use crate::plugin_system::tests::support::{linux_validator, touch_library, FactoryBehavior, FakeLoader, MockTab};
use crate::plugin_system::traits::{FnTabPlugin, TabPlugin, TextPanel};
use crate::plugin_system::validator::ValidationStatus;
use crate::storage::config::DiscoverySettings;

fn settings_for(plugins_dir: &Path) -> DiscoverySettings {
    DiscoverySettings {
        plugins_dir: plugins_dir.to_path_buf(),
        ..DiscoverySettings::default()
    }
}

fn discovery(plugins_dir: &Path, loader: FakeLoader, index: StaticPackageIndex) -> Discovery {
    Discovery::new(settings_for(plugins_dir))
        .with_loader(loader)
        .with_package_index(index)
        .with_validator(linux_validator())
}

fn active_names(view: &RegistryView) -> Vec<String> {
    view.active().iter().map(|e| e.name().to_string()).collect()
}

fn about_tab() -> impl TabPlugin {
    FnTabPlugin::new("About", "About this host", || Ok(Box::new(TextPanel::new("About", "tabhost"))))
}

#[test]
fn test_local_file_and_failing_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    touch_library(dir.path(), "a");
    let b = touch_library(dir.path(), "b");

    let loader = FakeLoader::new().with("a", MockTab::new("Alpha"));
    let view = discovery(dir.path(), loader, StaticPackageIndex::new()).discover();

    assert_eq!(active_names(&view), vec!["Alpha"]);
    let failures: Vec<_> = view.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].source_identifier, b.display().to_string());
    assert_eq!(failures[0].status, ValidationStatus::Invalid);
}

#[test]
fn test_local_overrides_entry_point_with_same_name() {
    let dir = tempdir().expect("Failed to create temp directory");
    let local_beta = touch_library(dir.path(), "beta");

    let index = StaticPackageIndex::new().with_entry(ENTRY_POINT_NAMESPACE, "netkit", "beta", "netkit_tabs:BETA_TAB");
    let loader = FakeLoader::new()
        .with("BETA_TAB", MockTab::new("Beta").description("from package"))
        .with("beta", MockTab::new("Beta").description("from plugins dir"));
    let view = discovery(dir.path(), loader, index).discover();

    assert_eq!(view.all().len(), 1);
    let beta = view.get("Beta").unwrap();
    assert_eq!(beta.descriptor.origin, Origin::Local);
    assert_eq!(beta.descriptor.source_identifier, local_beta.display().to_string());
    assert_eq!(
        view.diagnostics()["netkit:beta"].messages,
        vec![format!("overridden by {}", local_beta.display())]
    );
}

#[test]
fn test_malformed_file_among_valid_ones() {
    let dir = tempdir().expect("Failed to create temp directory");
    let mut loader = FakeLoader::new();
    for i in 0..4 {
        let stem = format!("tab{}", i);
        touch_library(dir.path(), &stem);
        loader = loader.with(&stem, MockTab::new(&format!("Tab {}", i)));
    }
    touch_library(dir.path(), "tab9_corrupt");

    let view = discovery(dir.path(), loader, StaticPackageIndex::new()).discover();
    assert_eq!(view.active().len(), 4);
    let invalid: Vec<_> = view
        .diagnostics()
        .values()
        .filter(|r| r.status == ValidationStatus::Invalid)
        .collect();
    assert_eq!(invalid.len(), 1);
}

#[test]
fn test_platform_and_factory_failures_stay_visible() {
    let dir = tempdir().expect("Failed to create temp directory");
    touch_library(dir.path(), "mac");
    touch_library(dir.path(), "flaky");
    touch_library(dir.path(), "crashy");

    let loader = FakeLoader::new()
        .with("mac", MockTab::new("MacOnly").platforms(&["macOS"]))
        .with("flaky", MockTab::new("Flaky").factory(FactoryBehavior::Fails("no device".to_string())))
        .with("crashy", MockTab::new("Crashy").factory(FactoryBehavior::Panics("boom".to_string())));
    let view = discovery(dir.path(), loader, StaticPackageIndex::new()).discover();

    assert_eq!(view.all().len(), 3);
    assert!(view.active().is_empty());
    assert_eq!(view.get("MacOnly").unwrap().status(), ValidationStatus::IncompatiblePlatform);
    assert_eq!(view.get("Flaky").unwrap().status(), ValidationStatus::FactoryError);
    let crashy = view.get("Crashy").unwrap();
    assert_eq!(crashy.status(), ValidationStatus::FactoryError);
    assert!(crashy.validation.messages[0].contains("boom"));
}

#[test]
fn test_core_plugins_register_first_and_can_be_shadowed() {
    let dir = tempdir().expect("Failed to create temp directory");
    touch_library(dir.path(), "about");
    let loader = FakeLoader::new().with("about", MockTab::new("About").description("local about"));

    let view = discovery(dir.path(), loader, StaticPackageIndex::new())
        .with_core_plugin(about_tab())
        .with_core_plugin(MockTab::new("Settings"))
        .discover();

    assert_eq!(view.names(), vec!["About", "Settings"]);
    assert_eq!(view.get("About").unwrap().descriptor.description, "local about");
    assert_eq!(view.core().len(), 1);
    assert!(view.diagnostics().contains_key("core:About"));
    assert!(view.diagnostics().contains_key("core:Settings"));
}

#[test]
fn test_duplicate_core_names_both_diagnosed() {
    let dir = tempdir().expect("Failed to create temp directory");
    let view = discovery(dir.path(), FakeLoader::new(), StaticPackageIndex::new())
        .with_core_plugin(MockTab::new("Dup").description("first"))
        .with_core_plugin(MockTab::new("Dup").description("second"))
        .discover();

    assert_eq!(view.diagnostics().len(), 2);
    assert_eq!(view.get("Dup").unwrap().descriptor.description, "second");
    assert_eq!(view.diagnostics()["core:Dup"].messages, vec!["overridden by core:Dup#2".to_string()]);
    assert!(view.diagnostics()["core:Dup#2"].messages.is_empty());
}

#[test]
fn test_broken_local_file_keeps_packaged_tab_active() {
    let dir = tempdir().expect("Failed to create temp directory");
    touch_library(dir.path(), "beta");

    let index = StaticPackageIndex::new().with_entry(ENTRY_POINT_NAMESPACE, "netkit", "beta", "netkit_tabs:BETA_TAB");
    let loader = FakeLoader::new()
        .with("BETA_TAB", MockTab::new("Beta"))
        .with("beta", MockTab::new("Beta").factory(FactoryBehavior::Fails("no device".to_string())));
    let view = discovery(dir.path(), loader, index).discover();

    assert_eq!(active_names(&view), vec!["Beta"]);
    assert_eq!(view.get("Beta").unwrap().descriptor.origin, Origin::EntryPoint);
    assert_eq!(view.failures().count(), 1);
}

#[test]
fn test_broken_core_plugin_never_aborts() {
    let dir = tempdir().expect("Failed to create temp directory");
    let view = discovery(dir.path(), FakeLoader::new(), StaticPackageIndex::new())
        .with_core_plugin(MockTab::new("Broken").panicking_metadata())
        .with_core_plugin(MockTab::new("Fine"))
        .discover();

    assert_eq!(active_names(&view), vec!["Fine"]);
    assert_eq!(view.failures().count(), 1);
    assert!(view.diagnostics().contains_key("core:#0"));
}

#[test]
fn test_unavailable_sources_degrade_to_diagnostics() {
    let dir = tempdir().expect("Failed to create temp directory");
    let not_a_dir = dir.path().join("plugins");
    fs::write(&not_a_dir, "").unwrap();

    let view = discovery(&not_a_dir, FakeLoader::new(), StaticPackageIndex::unavailable("locked"))
        .with_core_plugin(MockTab::new("Fine"))
        .discover();

    assert_eq!(active_names(&view), vec!["Fine"]);
    assert_eq!(view.failures().count(), 2);
    assert!(view.diagnostics().contains_key("entry-point-scanner:tabhost_tabs"));
    assert!(view.diagnostics().keys().any(|k| k.starts_with("local-scanner:")));
}

#[test]
fn test_discover_twice_is_independent() {
    let dir = tempdir().expect("Failed to create temp directory");
    touch_library(dir.path(), "a");
    let tab = MockTab::new("Alpha");
    let observer = tab.clone();
    let discovery = discovery(dir.path(), FakeLoader::new().with("a", tab), StaticPackageIndex::new());

    let first = discovery.discover();
    let second = discovery.discover();
    assert_eq!(first.names(), second.names());
    assert!(second.overrides().is_empty());
    // one factory check per run
    assert_eq!(observer.calls(), 2);
}

#[test]
fn test_spawned_discovery_blocking_wait() {
    let dir = tempdir().expect("Failed to create temp directory");
    touch_library(dir.path(), "a");
    let handle = discovery(dir.path(), FakeLoader::new().with("a", MockTab::new("Alpha")), StaticPackageIndex::new())
        .spawn();

    let view = handle.blocking_wait().expect("discovery should complete");
    assert_eq!(active_names(&view), vec!["Alpha"]);
}

#[tokio::test]
async fn test_spawned_discovery_async_wait() {
    let dir = tempdir().expect("Failed to create temp directory");
    let handle = discovery(dir.path(), FakeLoader::new(), StaticPackageIndex::new())
        .with_core_plugin(about_tab())
        .spawn();

    let view = handle.wait().await.expect("discovery should complete");
    assert_eq!(active_names(&view), vec!["About"]);
}

#[test]
fn test_try_take_resolves_once() {
    let dir = tempdir().expect("Failed to create temp directory");
    let mut handle = discovery(dir.path(), FakeLoader::new(), StaticPackageIndex::new())
        .with_core_plugin(MockTab::new("Fine"))
        .spawn();

    let mut outcome = None;
    for _ in 0..500 {
        if let Some(result) = handle.try_take() {
            outcome = Some(result);
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    let view = outcome.expect("discovery should finish").expect("discovery should complete");
    assert_eq!(active_names(&view), vec!["Fine"]);
    assert!(handle.try_take().is_none());
}

#[test]
fn test_dropped_sender_reports_aborted() {
    let (sender, mut handle) = DiscoveryHandle::detached();
    assert!(handle.try_take().is_none());
    drop(sender);
    assert!(matches!(
        handle.try_take(),
        Some(Err(PluginSystemError::DiscoveryAborted(_)))
    ));

    let (sender, handle) = DiscoveryHandle::detached();
    drop(sender);
    let outcome = futures::executor::block_on(handle.wait());
    assert!(matches!(outcome, Err(PluginSystemError::DiscoveryAborted(_))));
}
