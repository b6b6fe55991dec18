//! Shared world fixture for runtime integration tests.
#![allow(dead_code)]

use std::time::Duration;

use stats_core::{
    Attribute, AttributeId, AttributeKind, Character, CharacterId, ClassId, FormulaRegistry,
};
use stats_runtime::{
    BatchEvent, CharacterClass, Event, JobId, Repositories, RuntimeConfig, StatRuntime,
};
use tokio::sync::broadcast;

pub const FORCE: AttributeId = AttributeId(1);
pub const VIGUEUR: AttributeId = AttributeId(2);
pub const PRECISION: AttributeId = AttributeId(3);
pub const PV_MAX: AttributeId = AttributeId(10);
pub const CHARGE_MAX: AttributeId = AttributeId(11);
pub const RENOMMEE: AttributeId = AttributeId(20);

pub const WARRIOR: ClassId = ClassId(1);
pub const MAGE: ClassId = ClassId(2);

/// Warrior with a +5 personal override on force.
pub const HERO: CharacterId = CharacterId(1);
/// Plain warrior.
pub const SQUIRE: CharacterId = CharacterId(2);
/// Plain mage.
pub const APPRENTICE: CharacterId = CharacterId(3);

pub fn catalog() -> Vec<Attribute> {
    vec![
        Attribute::new(FORCE, "force", AttributeKind::BaseInteger)
            .with_label("Force")
            .with_bounds(Some(0.0), Some(100.0))
            .with_display_order(1),
        Attribute::new(VIGUEUR, "vigueur", AttributeKind::BaseInteger)
            .with_label("Vigueur")
            .with_display_order(2),
        Attribute::new(PRECISION, "precision", AttributeKind::BaseDecimal)
            .with_label("Precision")
            .with_default(1.5)
            .with_display_order(3),
        Attribute::new(PV_MAX, "pv-max", AttributeKind::Derived)
            .with_label("PV max")
            .with_display_order(10),
        Attribute::new(CHARGE_MAX, "charge-max", AttributeKind::Derived)
            .with_label("Charge max")
            .with_display_order(11),
        Attribute::new(RENOMMEE, "renommee", AttributeKind::ComputedCached)
            .with_label("Renommee")
            .with_visibility(false)
            .with_display_order(20),
    ]
}

/// Seeds the catalog, two classes and `HERO`, `SQUIRE`, `APPRENTICE`.
///
/// Warriors: force 15, vigueur 10. Mages: force 5, vigueur 8.
pub fn seeded_repositories() -> Repositories {
    let repos = Repositories::in_memory();
    for attribute in catalog() {
        repos.attributes.save(attribute).unwrap();
    }

    repos
        .characters
        .save_class(CharacterClass::new(WARRIOR, "Guerrier"))
        .unwrap();
    repos
        .characters
        .save_class(CharacterClass::new(MAGE, "Mage"))
        .unwrap();
    repos.sources.set_baseline(WARRIOR, FORCE, 15.0).unwrap();
    repos.sources.set_baseline(WARRIOR, VIGUEUR, 10.0).unwrap();
    repos.sources.set_baseline(MAGE, FORCE, 5.0).unwrap();
    repos.sources.set_baseline(MAGE, VIGUEUR, 8.0).unwrap();

    repos
        .characters
        .save(Character::new(HERO, WARRIOR, "Aldric"))
        .unwrap();
    repos
        .characters
        .save(Character::new(SQUIRE, WARRIOR, "Bertin"))
        .unwrap();
    repos
        .characters
        .save(Character::new(APPRENTICE, MAGE, "Ysolde"))
        .unwrap();
    repos.sources.set_override(HERO, FORCE, 5.0).unwrap();

    repos
}

/// Adds `count` warriors with ids starting at 100.
pub fn add_warriors(repos: &Repositories, count: u64) -> Vec<CharacterId> {
    (0..count)
        .map(|i| {
            let id = CharacterId(100 + i);
            repos
                .characters
                .save(Character::new(id, WARRIOR, format!("Recrue {i}")))
                .unwrap();
            id
        })
        .collect()
}

pub async fn start(repos: Repositories) -> StatRuntime {
    start_with(repos, RuntimeConfig::default(), FormulaRegistry::builtin()).await
}

pub async fn start_with(
    repos: Repositories,
    config: RuntimeConfig,
    formulas: FormulaRegistry,
) -> StatRuntime {
    StatRuntime::builder()
        .config(config)
        .repositories(repos)
        .formulas(formulas)
        .build()
        .await
        .expect("runtime should build")
}

/// Waits until every job in `jobs` has published `Completed`.
pub async fn wait_for_jobs(rx: &mut broadcast::Receiver<Event>, jobs: &[JobId]) {
    let mut pending: Vec<JobId> = jobs.to_vec();
    tokio::time::timeout(Duration::from_secs(5), async {
        while !pending.is_empty() {
            match rx.recv().await {
                Ok(Event::Batch(BatchEvent::Completed(report))) => {
                    pending.retain(|job| *job != report.job);
                }
                Ok(Event::Batch(BatchEvent::Failed { job, error })) => {
                    panic!("{job} failed: {error}");
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(e) => panic!("event stream ended: {e}"),
            }
        }
    })
    .await
    .expect("batch jobs should complete");
}
