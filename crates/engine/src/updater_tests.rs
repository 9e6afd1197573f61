// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{as_instance, TestInstance};
use bh_core::{FakeClock, UpdateError};
use std::sync::atomic::{AtomicUsize, Ordering};

fn report(layout_preserved: bool, methods_migrated: bool) -> RedefineReport {
    RedefineReport { layout_preserved, methods_migrated, detail: None }
}

fn updater(tracker: Arc<InstanceTracker>) -> InstanceUpdater<FakeClock> {
    InstanceUpdater::new(tracker, UpdatePolicy::default(), FakeClock::new())
}

#[test]
fn untracked_class_is_no_update_with_zero_counts() {
    let updater = updater(Arc::new(InstanceTracker::new()));
    let outcome = updater.apply("com.example.Empty", &report(true, true));
    assert_eq!(outcome.method(), UpdateMethod::NoUpdate);
    assert_eq!((outcome.updated(), outcome.total(), outcome.failed()), (0, 0, 0));
}

#[test]
fn platform_migration_selects_automatic() {
    let tracker = Arc::new(InstanceTracker::new());
    let a = TestInstance::new("X");
    let b = TestInstance::new("X");
    tracker.track(&as_instance(&a));
    tracker.track(&as_instance(&b));

    let outcome = updater(tracker).apply("X", &report(true, true));
    assert_eq!(outcome.method(), UpdateMethod::Automatic);
    assert_eq!((outcome.updated(), outcome.total(), outcome.failed()), (2, 2, 0));
    // Automatic means no per-instance work happened
    assert_eq!(a.reinitialized.load(Ordering::SeqCst), 0);
}

#[test]
fn partial_migration_is_not_automatic() {
    let tracker = Arc::new(InstanceTracker::new());
    let a = TestInstance::new("X");
    tracker.track(&as_instance(&a));

    let outcome = updater(tracker).apply("X", &report(true, false));
    assert_eq!(outcome.method(), UpdateMethod::Reflection);
    assert_eq!(a.reinitialized.load(Ordering::SeqCst), 1);
}

#[test]
fn all_proxies_select_proxy_refresh() {
    let tracker = Arc::new(InstanceTracker::new());
    let a = TestInstance::proxy("X");
    let b = TestInstance::proxy("X");
    tracker.track(&as_instance(&a));
    tracker.track(&as_instance(&b));

    let outcome = updater(tracker).apply("X", &report(false, false));
    assert_eq!(outcome.method(), UpdateMethod::ProxyRefresh);
    assert_eq!((outcome.updated(), outcome.total(), outcome.failed()), (2, 2, 0));
    assert_eq!(a.proxy_refreshed.load(Ordering::SeqCst), 1);
    assert_eq!(b.proxy_refreshed.load(Ordering::SeqCst), 1);
}

#[test]
fn mixed_instances_do_not_proxy_refresh() {
    let tracker = Arc::new(InstanceTracker::new());
    let a = TestInstance::proxy("X");
    let b = TestInstance::new("X");
    tracker.track(&as_instance(&a));
    tracker.track(&as_instance(&b));

    let outcome = updater(tracker).apply("X", &report(false, false));
    assert_eq!(outcome.method(), UpdateMethod::Reflection);
}

#[test]
fn factory_managed_class_resets_via_factory() {
    struct CountingFactory(AtomicUsize);
    impl InstanceFactory for CountingFactory {
        fn reset(&self, _class_name: &str) -> Result<usize, UpdateError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(3)
        }
    }

    let tracker = Arc::new(InstanceTracker::new());
    let a = TestInstance::new("X");
    tracker.track(&as_instance(&a));

    let updater = updater(tracker);
    let factory = Arc::new(CountingFactory(AtomicUsize::new(0)));
    updater.register_factory("X", factory.clone());

    let outcome = updater.apply("X", &report(false, false));
    assert_eq!(outcome.method(), UpdateMethod::FactoryReset);
    assert_eq!((outcome.updated(), outcome.total(), outcome.failed()), (1, 1, 0));
    assert_eq!(factory.0.load(Ordering::SeqCst), 1);
    // Reflection never ran
    assert_eq!(a.reinitialized.load(Ordering::SeqCst), 0);
}

#[test]
fn factory_failure_counts_everything_failed() {
    struct BrokenFactory;
    impl InstanceFactory for BrokenFactory {
        fn reset(&self, _class_name: &str) -> Result<usize, UpdateError> {
            Err(UpdateError::FactoryReset("registry offline".to_string()))
        }
    }

    let tracker = Arc::new(InstanceTracker::new());
    let a = TestInstance::new("X");
    tracker.track(&as_instance(&a));

    let updater = updater(tracker);
    updater.register_factory("X", Arc::new(BrokenFactory));

    let outcome = updater.apply("X", &report(false, false));
    assert_eq!(outcome.method(), UpdateMethod::FactoryReset);
    assert_eq!((outcome.updated(), outcome.total(), outcome.failed()), (0, 1, 1));
    assert!(outcome.detail().unwrap_or_default().contains("registry offline"));
}

#[test]
fn reflection_isolates_single_failures() {
    let tracker = Arc::new(InstanceTracker::new());
    let good1 = TestInstance::new("X");
    let bad = TestInstance::failing("X");
    let good2 = TestInstance::new("X");
    tracker.track(&as_instance(&good1));
    tracker.track(&as_instance(&bad));
    tracker.track(&as_instance(&good2));

    let outcome = updater(tracker).apply("X", &report(false, false));
    assert_eq!(outcome.method(), UpdateMethod::Reflection);
    assert_eq!((outcome.updated(), outcome.total(), outcome.failed()), (2, 3, 1));
    // The failure in the middle did not abort the siblings
    assert_eq!(good1.reinitialized.load(Ordering::SeqCst), 1);
    assert_eq!(good2.reinitialized.load(Ordering::SeqCst), 1);
}

#[test]
fn reclaimed_instances_are_skipped_silently() {
    let tracker = Arc::new(InstanceTracker::new());
    let kept = TestInstance::new("X");
    let dropped = TestInstance::new("X");
    tracker.track(&as_instance(&kept));
    tracker.track(&as_instance(&dropped));
    drop(dropped);

    let outcome = updater(tracker).apply("X", &report(false, false));
    assert_eq!((outcome.updated(), outcome.total(), outcome.failed()), (1, 1, 0));
}

#[test]
fn disabled_strategies_fall_through() {
    let tracker = Arc::new(InstanceTracker::new());
    let a = TestInstance::new("X");
    tracker.track(&as_instance(&a));

    // Automatic disabled: a fully-migrated report still reflects
    let policy = UpdatePolicy {
        enabled: vec![UpdateMethod::Reflection, UpdateMethod::NoUpdate],
    };
    let updater = InstanceUpdater::new(tracker, policy, FakeClock::new());
    let outcome = updater.apply("X", &report(true, true));
    assert_eq!(outcome.method(), UpdateMethod::Reflection);
    assert_eq!(a.reinitialized.load(Ordering::SeqCst), 1);
}

#[test]
fn nothing_enabled_is_no_update_with_total() {
    let tracker = Arc::new(InstanceTracker::new());
    let a = TestInstance::new("X");
    tracker.track(&as_instance(&a));

    let updater =
        InstanceUpdater::new(tracker, UpdatePolicy { enabled: Vec::new() }, FakeClock::new());
    let outcome = updater.apply("X", &report(true, true));
    assert_eq!(outcome.method(), UpdateMethod::NoUpdate);
    assert_eq!((outcome.updated(), outcome.total(), outcome.failed()), (0, 1, 0));
}

#[test]
fn outcome_invariant_holds() {
    let tracker = Arc::new(InstanceTracker::new());
    for _ in 0..3 {
        // Instances dropped immediately; only live ones count
        let i = TestInstance::new("X");
        tracker.track(&as_instance(&i));
    }
    let live = TestInstance::failing("X");
    tracker.track(&as_instance(&live));

    let outcome = updater(tracker).apply("X", &report(false, false));
    assert!(outcome.updated() + outcome.failed() <= outcome.total());
    assert_eq!((outcome.updated(), outcome.total(), outcome.failed()), (0, 1, 1));
}
