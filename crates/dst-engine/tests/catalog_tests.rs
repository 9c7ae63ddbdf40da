//! Tests for the zone database and zone-by-name lookups.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use dst_engine::{
    day_length_hours_for_zone, lookup_next_transition, lookup_season, next_transition_for_zone,
    AdjustmentRule, Catalog, DstError, NoTransition, RuleSet, TimeZoneInfo, TransitionRule,
    ZoneDatabase,
};

const CE: &str = "Central Europe Standard Time";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    date(y, mo, d).and_hms_opt(h, mi, s).unwrap()
}

fn builtin() -> Catalog {
    Catalog::builtin().expect("builtin catalog must load")
}

fn info(id: &str) -> TimeZoneInfo {
    TimeZoneInfo {
        id: id.to_string(),
        display_name: format!("(UTC) {}", id),
        standard_name: id.to_string(),
        iana: None,
    }
}

// ---------------------------------------------------------------------------
// Builtin catalog
// ---------------------------------------------------------------------------

#[test]
fn builtin_lists_all_zones() {
    let catalog = builtin();
    let zones = catalog.list_timezones();
    assert_eq!(zones.len(), catalog.len());
    assert!(zones.iter().any(|z| z.id == CE));
    assert!(zones.iter().any(|z| z.id == "UTC"));
    assert!(zones.iter().all(|z| !z.display_name.is_empty()));
}

#[test]
fn zone_found_by_iana_name() {
    let catalog = builtin();
    let (info, rules) = catalog.zone("Europe/Budapest").unwrap();
    assert_eq!(info.id, CE);
    assert_eq!(rules.len(), 2);
}

#[test]
fn unknown_zone_has_no_rules() {
    assert!(builtin().adjustment_rules("Mars/Olympus_Mons").is_none());
}

#[test]
fn next_transition_for_central_europe() {
    let catalog = builtin();
    let cases = [
        (at(2017, 1, 1, 0, 0, 0), at(2017, 3, 26, 2, 0, 0)),
        (at(2017, 3, 27, 0, 0, 0), at(2017, 10, 29, 3, 0, 0)),
        (at(2017, 10, 29, 0, 0, 0), at(2017, 10, 29, 3, 0, 0)),
    ];
    for (as_of, expected) in cases {
        let next = next_transition_for_zone(&catalog, CE, as_of).unwrap();
        assert_eq!(next.at, expected, "as of {}", as_of);
    }
}

#[test]
fn lookups_report_why_there_is_no_transition() {
    let catalog = builtin();
    let as_of = at(2017, 1, 1, 0, 0, 0);

    assert_eq!(
        lookup_next_transition(&catalog, "Nowhere Standard Time", as_of),
        Err(NoTransition::UnknownZone)
    );
    assert_eq!(
        lookup_next_transition(&catalog, "Tokyo Standard Time", as_of),
        Err(NoTransition::NoRules)
    );
    assert_eq!(
        lookup_next_transition(&catalog, "Iran Standard Time", at(2030, 1, 1, 0, 0, 0)),
        Err(NoTransition::NoRuleForYear(2030))
    );
    assert_eq!(
        next_transition_for_zone(&catalog, "Nowhere Standard Time", as_of),
        None
    );

    // Rules end in 2015: after the last 2015 transition the miss is 2016.
    let mut ended = Catalog::default();
    let rules = dst_engine::PosixTz::parse("CET-1CEST,M3.5.0,M10.5.0/3")
        .unwrap()
        .adjustment_rule(date(2010, 1, 1), date(2015, 12, 31))
        .unwrap()
        .unwrap();
    ended
        .insert(info("Ended Standard Time"), RuleSet::new(vec![rules]))
        .unwrap();
    let reason = lookup_next_transition(&ended, "Ended Standard Time", at(2015, 11, 1, 0, 0, 0))
        .unwrap_err();
    assert_eq!(reason, NoTransition::NoRuleForYear(2016));
    assert_eq!(reason.to_string(), "no adjustment rules available for 2016");
    assert_eq!(
        lookup_next_transition(&ended, "Ended Standard Time", at(2009, 6, 1, 0, 0, 0)),
        Err(NoTransition::NoRuleForYear(2009))
    );
}

#[test]
fn iran_fixed_rules() {
    let catalog = builtin();
    let next = next_transition_for_zone(&catalog, "Iran Standard Time", at(2018, 1, 1, 0, 0, 0))
        .unwrap();
    assert_eq!(next.at, at(2018, 3, 22, 0, 0, 0));

    let next = next_transition_for_zone(&catalog, "Iran Standard Time", at(2018, 9, 21, 12, 0, 0))
        .unwrap();
    assert_eq!(next.at, at(2018, 9, 21, 23, 59, 59));

    // 2022 was the last year with rules; the rollover into 2023 finds none.
    assert_eq!(
        lookup_next_transition(&catalog, "Iran Standard Time", at(2022, 10, 1, 0, 0, 0)),
        Err(NoTransition::NoRuleForYear(2023))
    );
}

#[test]
fn day_length_by_zone_name() {
    let catalog = builtin();
    assert_eq!(day_length_hours_for_zone(&catalog, CE, date(2017, 3, 26)), Some(23));
    assert_eq!(day_length_hours_for_zone(&catalog, CE, date(2017, 10, 29)), Some(25));
    assert_eq!(day_length_hours_for_zone(&catalog, CE, date(2017, 6, 15)), Some(24));
    assert_eq!(
        day_length_hours_for_zone(&catalog, "UTC", date(2017, 3, 26)),
        Some(24)
    );
    assert_eq!(
        day_length_hours_for_zone(&catalog, "Nowhere", date(2017, 3, 26)),
        None
    );
}

#[test]
fn seasons_by_zone_name() {
    let catalog = builtin();

    let ce = lookup_season(&catalog, CE, 2017).unwrap();
    assert_eq!(ce.start, at(2017, 3, 26, 2, 0, 0));
    assert_eq!(ce.end, Some(at(2017, 10, 29, 3, 0, 0)));
    assert_eq!(ce.end_year, 2017);

    let sydney = lookup_season(&catalog, "AUS Eastern Standard Time", 2017).unwrap();
    assert_eq!(sydney.end, Some(at(2018, 4, 1, 3, 0, 0)));
    assert_eq!(sydney.end_year, 2018);

    assert_eq!(
        lookup_season(&catalog, "Iran Standard Time", 2024),
        Err(NoTransition::NoRuleForYear(2024))
    );
    assert_eq!(lookup_season(&catalog, "UTC", 2017), Err(NoTransition::NoRules));
}

#[test]
fn older_rule_era_is_selected_for_older_years() {
    let catalog = builtin();
    // Before 1996 summer time in Europe ended on the last Sunday of September.
    let next = next_transition_for_zone(&catalog, "W. Europe Standard Time", at(1995, 4, 1, 0, 0, 0))
        .unwrap();
    assert_eq!(next.at, at(1995, 9, 24, 3, 0, 0));
}

// ---------------------------------------------------------------------------
// Custom catalogs
// ---------------------------------------------------------------------------

#[test]
fn catalog_from_json_with_explicit_and_posix_rules() {
    let json = r#"{
        "zones": [
            {
                "id": "Test Standard Time",
                "display_name": "(UTC+01:00) Test",
                "standard_name": "Test Standard Time",
                "rules": [
                    {
                        "date_start": "2000-01-01",
                        "date_end": "2009-12-31",
                        "start": { "kind": "floating", "month": 4, "week": 1, "weekday": "Sun", "time": "02:00:00" },
                        "end": { "kind": "fixed", "month": 10, "day": 1, "time": "03:00:00" },
                        "daylight_delta_minutes": 30
                    },
                    { "date_start": "2010-01-01", "date_end": "2020-12-31", "posix": "TST-1TDT,M3.5.0,M10.5.0/3" }
                ]
            }
        ]
    }"#;
    let catalog = Catalog::from_json(json).unwrap();
    let rules = catalog.adjustment_rules("Test Standard Time").unwrap();
    assert_eq!(rules.len(), 2);

    let first = rules.select_for_year(2005).unwrap();
    assert_eq!(first.daylight_delta_minutes, 30);
    assert!(first.end.is_fixed_date());

    let second = rules.select_for_year(2015).unwrap();
    assert_eq!(second.daylight_delta_minutes, 60);
    assert!(!second.start.is_fixed_date());
}

#[test]
fn catalog_round_trips_through_a_file() {
    let path = std::env::temp_dir().join("dst-engine-catalog-test.json");
    std::fs::write(
        &path,
        r#"{"zones":[{"id":"A","display_name":"A","standard_name":"A"}]}"#,
    )
    .unwrap();
    let catalog = Catalog::from_path(&path).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.adjustment_rules("A"), Some(RuleSet::empty()));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_catalog_file_is_an_io_error() {
    let err = Catalog::from_path("/nonexistent/dst/catalog.json").unwrap_err();
    assert!(matches!(err, DstError::Io(_)));
}

#[test]
fn malformed_json_is_rejected() {
    assert!(matches!(
        Catalog::from_json("{ not json"),
        Err(DstError::Catalog(_))
    ));
}

#[test]
fn bad_posix_rule_is_rejected() {
    let json = r#"{"zones":[{"id":"A","display_name":"A","standard_name":"A",
        "rules":[{"date_start":"2000-01-01","date_end":"2001-01-01","posix":"CET-1CEST"}]}]}"#;
    assert!(matches!(
        Catalog::from_json(json),
        Err(DstError::Posix { .. })
    ));
}

#[test]
fn out_of_range_explicit_rule_is_rejected() {
    let json = r#"{"zones":[{"id":"A","display_name":"A","standard_name":"A",
        "rules":[{"date_start":"2000-01-01","date_end":"2001-01-01",
            "start":{"kind":"floating","month":3,"week":6,"weekday":"Sun","time":"02:00:00"},
            "end":{"kind":"floating","month":10,"week":5,"weekday":"Sun","time":"03:00:00"}}]}]}"#;
    assert!(matches!(
        Catalog::from_json(json),
        Err(DstError::InvalidRule(_))
    ));
}

#[test]
fn explicit_rule_field_errors_are_reported() {
    let json = r#"{"zones":[{"id":"A","display_name":"A","standard_name":"A",
        "rules":[{"date_start":"2000-01-01","date_end":"2001-01-01",
            "start":{"kind":"sometimes","month":3,"day":1,"time":"02:00:00"},
            "end":{"kind":"fixed","month":10,"day":1,"time":"03:00:00"}}]}]}"#;
    let err = Catalog::from_json(json).unwrap_err();
    assert!(matches!(err, DstError::Catalog(_)));
    let message = err.to_string();
    assert!(message.contains("sometimes"), "{}", message);
    assert!(!message.contains("untagged"), "{}", message);
}

#[test]
fn posix_rule_field_errors_are_reported() {
    let json = r#"{"zones":[{"id":"A","display_name":"A","standard_name":"A",
        "rules":[{"date_start":"2000-13-01","date_end":"2001-01-01","posix":"CET-1CEST,M3.5.0,M10.5.0/3"}]}]}"#;
    let err = Catalog::from_json(json).unwrap_err();
    assert!(matches!(err, DstError::Catalog(_)));
    assert!(!err.to_string().contains("untagged"), "{}", err);
}

#[test]
fn reversed_validity_range_is_rejected() {
    let json = r#"{"zones":[{"id":"A","display_name":"A","standard_name":"A",
        "rules":[{"date_start":"2010-01-01","date_end":"2001-01-01","posix":"CET-1CEST,M3.5.0,M10.5.0/3"}]}]}"#;
    assert!(matches!(
        Catalog::from_json(json),
        Err(DstError::InvalidAdjustment(_))
    ));
}

#[test]
fn duplicate_ids_and_unknown_iana_names_are_rejected() {
    let mut catalog = Catalog::default();
    catalog.insert(info("A"), RuleSet::empty()).unwrap();
    assert!(matches!(
        catalog.insert(info("A"), RuleSet::empty()),
        Err(DstError::InvalidTimezone(_))
    ));

    let mut bogus = info("B");
    bogus.iana = Some("Atlantis/Capital".to_string());
    assert!(matches!(
        catalog.insert(bogus, RuleSet::empty()),
        Err(DstError::InvalidTimezone(_))
    ));
}

#[test]
fn inserted_zone_is_served_through_the_trait() {
    let two_am = NaiveTime::from_hms_opt(2, 0, 0).unwrap();
    let rule = AdjustmentRule::new(
        date(2000, 1, 1),
        date(2100, 12, 31),
        TransitionRule::floating(3, 2, Weekday::Sun, two_am).unwrap(),
        TransitionRule::floating(11, 1, Weekday::Sun, two_am).unwrap(),
    )
    .unwrap();
    let mut catalog = Catalog::default();
    catalog
        .insert(info("US Test"), RuleSet::new(vec![rule]))
        .unwrap();

    let db: &dyn ZoneDatabase = &catalog;
    assert_eq!(db.list_timezones().len(), 1);
    assert_eq!(
        next_transition_for_zone(db, "US Test", at(2017, 6, 1, 0, 0, 0))
            .unwrap()
            .at,
        at(2017, 11, 5, 2, 0, 0)
    );
}
