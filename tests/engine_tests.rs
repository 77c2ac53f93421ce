//! End-to-end tests for the aggregation engine over a live record store.

mod support;

use chrono::Duration;
use dealflow::domain::{CustomerId, Deal, DealId, Snapshot, Stage, Status};
use dealflow::engine::{
    self, HealthThresholds, MoveStage, conversion_rates, move_stage, stage_distribution, velocity,
};
use dealflow::error::Error;
use dealflow::store::{MemoryStore, RecordStore};
use dealflow::testkit::domain::{at, epoch, transition_on_day};
use rust_decimal_macros::dec;
use support::snapshot_from;

fn seed_deal(store: &MemoryStore, title: &str, value: rust_decimal::Decimal) -> DealId {
    let deal = Deal::try_new(
        DealId::new("unset"),
        CustomerId::new("c1"),
        title,
        value,
        Stage::Lead,
        epoch(),
    )
    .unwrap();
    store.create_deal(deal).unwrap().id
}

#[test]
fn full_lifecycle_from_lead_to_won_is_reflected_in_aggregates() {
    let store = MemoryStore::new();
    let id = seed_deal(&store, "Enterprise rollout", dec!(100000));

    move_stage(&store, &id, MoveStage::to(Stage::Qualified), at(2024, 1, 10)).unwrap();
    move_stage(&store, &id, MoveStage::to(Stage::Proposal), at(2024, 1, 20)).unwrap();
    move_stage(&store, &id, MoveStage::to(Stage::Negotiation), at(2024, 2, 1)).unwrap();

    let snapshot = snapshot_from(&store);
    let distribution = stage_distribution(&snapshot);
    assert_eq!(distribution[&Stage::Negotiation].count, 1);
    assert_eq!(distribution[&Stage::Negotiation].total_value, dec!(100000));
    // Negotiation default probability is 75.
    assert_eq!(
        distribution[&Stage::Negotiation].weighted_value,
        dec!(75000)
    );

    move_stage(&store, &id, MoveStage::to(Stage::Won), at(2024, 2, 15)).unwrap();

    let snapshot = snapshot_from(&store);
    // Won deals leave the current-pipeline view.
    let distribution = stage_distribution(&snapshot);
    assert_eq!(distribution[&Stage::Negotiation].count, 0);

    let deal = store.deal(&id).unwrap();
    assert_eq!(deal.status, Status::Won);
    assert_eq!(deal.probability, 100);

    // Four transitions, each step recorded once.
    assert_eq!(snapshot.transitions.len(), 4);
    let history = snapshot.transitions.for_deal(&id);
    assert_eq!(history[0].from_stage, Stage::Lead);
    assert_eq!(history[3].to_stage, Stage::Won);
}

#[test]
fn conversion_rates_round_trip_from_synthetic_log() {
    let log = dealflow::domain::TransitionLog::new(vec![
        transition_on_day("d1", Stage::Lead, Stage::Qualified, 1),
        transition_on_day("d2", Stage::Lead, Stage::Qualified, 2),
        transition_on_day("d3", Stage::Lead, Stage::Qualified, 3),
        transition_on_day("d4", Stage::Lead, Stage::Lost, 4),
    ]);

    let rates = conversion_rates(&log);
    assert_eq!(rates[&Stage::Lead][&Stage::Qualified], dec!(75.0));
    assert_eq!(rates[&Stage::Lead][&Stage::Lost], dec!(25.0));
}

#[test]
fn stage_distribution_over_empty_snapshot_has_every_stage_zeroed() {
    let distribution = stage_distribution(&Snapshot::default());
    assert_eq!(distribution.len(), 7);
    for metrics in distribution.values() {
        assert_eq!(metrics.count, 0);
        assert_eq!(metrics.total_value, dec!(0));
        assert_eq!(metrics.weighted_value, dec!(0));
        assert_eq!(metrics.avg_probability, dec!(0));
    }
}

#[test]
fn same_stage_move_creates_no_history_and_keeps_updated_date() {
    let store = MemoryStore::new();
    let id = seed_deal(&store, "Idempotent", dec!(500));
    let before = store.deal(&id).unwrap();

    move_stage(&store, &id, MoveStage::to(Stage::Lead), at(2024, 9, 9)).unwrap();

    let after = store.deal(&id).unwrap();
    assert_eq!(after.updated_date, before.updated_date);
    assert!(store.transitions().unwrap().is_empty());
}

#[test]
fn velocity_pairs_entries_and_exits_across_the_store_log() {
    let store = MemoryStore::new();
    let id = seed_deal(&store, "Velocity", dec!(500));

    move_stage(&store, &id, MoveStage::to(Stage::Qualified), at(2024, 1, 5)).unwrap();
    move_stage(&store, &id, MoveStage::to(Stage::Proposal), at(2024, 1, 19)).unwrap();

    let snapshot = snapshot_from(&store);
    let dwell = velocity(&snapshot.transitions);
    assert_eq!(dwell[&Stage::Qualified].avg_days, dec!(14));
    assert_eq!(dwell[&Stage::Qualified].sample_size, 1);
}

#[test]
fn lost_update_race_yields_conflict_not_silent_overwrite() {
    let store = MemoryStore::new();
    let id = seed_deal(&store, "Contested", dec!(500));

    // Two actors read the same version.
    let observed = store.deal(&id).unwrap();

    move_stage(&store, &id, MoveStage::to(Stage::Qualified), at(2024, 1, 5)).unwrap();

    let mut stale = observed.clone();
    stale.stage = Stage::Lost;
    stale.status = Status::Lost;
    let err = store.update_deal(&stale, observed.version).unwrap_err();
    assert!(matches!(err, Error::Conflict { .. }));

    // The first writer's state stands.
    assert_eq!(store.deal(&id).unwrap().stage, Stage::Qualified);
}

#[test]
fn aggregate_snapshot_serializes_for_the_presentation_layer() {
    let store = MemoryStore::new();
    let id = seed_deal(&store, "Serializable", dec!(2000));
    move_stage(&store, &id, MoveStage::to(Stage::Qualified), at(2024, 1, 5)).unwrap();

    let snapshot = snapshot_from(&store);
    let aggregate = engine::aggregate(&snapshot, at(2024, 2, 1), &HealthThresholds::default());

    let json = serde_json::to_value(&aggregate).unwrap();
    assert_eq!(json["distribution"]["Qualified"]["count"], 1);
    assert!(json["health"]["score"].is_number());
    assert!(!json["conversion"]["Lead"]["Qualified"].is_null());
}

#[test]
fn probability_override_survives_the_store_round_trip() {
    let store = MemoryStore::new();
    let id = seed_deal(&store, "Override", dec!(500));

    move_stage(
        &store,
        &id,
        MoveStage::to(Stage::Proposal).with_probability(35),
        at(2024, 1, 5),
    )
    .unwrap();

    assert_eq!(store.deal(&id).unwrap().probability, 35);

    // A later non-override move re-applies stage defaults.
    move_stage(&store, &id, MoveStage::to(Stage::Negotiation), at(2024, 1, 9)).unwrap();
    assert_eq!(store.deal(&id).unwrap().probability, 75);
}

#[test]
fn deal_age_is_measured_in_whole_days() {
    let store = MemoryStore::new();
    let id = seed_deal(&store, "Aging", dec!(500));
    let deal = store.deal(&id).unwrap();
    assert_eq!(deal.age_days(epoch() + Duration::days(40)), 40);
}
