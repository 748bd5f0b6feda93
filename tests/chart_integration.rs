//! End-to-end chart checks against the built-in analytic ephemeris.

use approx::assert_abs_diff_eq;
use chrono::{NaiveDate, NaiveDateTime};
use kundli_chat::{
    create_chart, AnalyticEphemeris, CelestialBody, ChartError, EphemerisError, ALL_BODIES,
};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn sample_births() -> Vec<NaiveDateTime> {
    vec![
        at(1800, 1, 1, 0, 0),
        at(1900, 3, 15, 4, 30),
        at(1947, 8, 15, 0, 0),
        at(1969, 7, 20, 20, 17),
        at(1991, 6, 18, 7, 10),
        at(2000, 1, 1, 12, 0),
        at(2024, 2, 29, 23, 59),
        at(2150, 10, 31, 6, 45),
        at(2399, 12, 31, 23, 0),
    ]
}

#[test]
fn every_chart_has_nine_normalized_bodies() {
    let eph = AnalyticEphemeris::new();
    for birth in sample_births() {
        let analyzer = create_chart("Test", birth, "Nowhere", &eph).unwrap();
        let chart = analyzer.chart();
        assert_eq!(chart.len(), 9);

        let bodies: Vec<CelestialBody> = chart.iter().map(|(body, _)| body).collect();
        assert_eq!(bodies, ALL_BODIES);
        for (body, position) in chart.iter() {
            assert!(
                (0.0..360.0).contains(&position.longitude),
                "{birth}: {body} at {}",
                position.longitude
            );
        }
    }
}

#[test]
fn ketu_opposes_rahu_in_every_chart() {
    let eph = AnalyticEphemeris::new();
    for birth in sample_births() {
        let analyzer = create_chart("Test", birth, "Nowhere", &eph).unwrap();
        let rahu = analyzer.position(CelestialBody::Rahu);
        let ketu = analyzer.position(CelestialBody::Ketu);
        assert_abs_diff_eq!(
            ketu.longitude,
            (rahu.longitude + 180.0) % 360.0,
            epsilon = 1e-9
        );
        assert_eq!(ketu.speed, rahu.speed);
        assert!(rahu.is_retrograde());
    }
}

#[test]
fn aspects_cover_each_pair_once() {
    let eph = AnalyticEphemeris::new();
    for birth in sample_births() {
        let analyzer = create_chart("Test", birth, "Nowhere", &eph).unwrap();
        let aspects = analyzer.all_aspects();
        assert_eq!(aspects.len(), 36);
        for (i, a) in aspects.iter().enumerate() {
            assert!((0.0..=180.0).contains(&a.degrees));
            assert_ne!(a.body_a, a.body_b);
            for b in &aspects[i + 1..] {
                assert!(!(a.body_a == b.body_a && a.body_b == b.body_b));
                assert!(!(a.body_a == b.body_b && a.body_b == b.body_a));
            }
        }
        let rahu_ketu = aspects
            .iter()
            .find(|a| a.body_a == CelestialBody::Ketu && a.body_b == CelestialBody::Rahu)
            .unwrap();
        assert_abs_diff_eq!(rahu_ketu.degrees, 180.0, epsilon = 1e-9);
    }
}

#[test]
fn same_instant_gives_same_chart() {
    let eph = AnalyticEphemeris::new();
    let first = create_chart("A", at(2000, 1, 1, 12, 0), "Delhi", &eph).unwrap();
    let second = create_chart("A", at(2000, 1, 1, 12, 0), "Delhi", &eph).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.chart().julian_day(), 2451545.0);
    assert_eq!(first.respond("planets"), second.respond("planets"));
}

#[test]
fn j2000_reference_positions() {
    let eph = AnalyticEphemeris::new();
    let analyzer = create_chart("A", at(2000, 1, 1, 12, 0), "Delhi", &eph).unwrap();
    assert_abs_diff_eq!(analyzer.position_of("Sun"), 280.37, epsilon = 0.05);
    assert_abs_diff_eq!(analyzer.position_of("Moon"), 223.32, epsilon = 0.5);
    assert_abs_diff_eq!(analyzer.position_of("Rahu"), 125.04, epsilon = 0.01);
    assert_abs_diff_eq!(analyzer.position_of("Ketu"), 305.04, epsilon = 0.01);
    assert_eq!(analyzer.position_of("Pluto"), 0.0);
}

#[test]
fn place_does_not_move_the_planets() {
    let eph = AnalyticEphemeris::new();
    let here = create_chart("A", at(1991, 6, 18, 7, 10), "Calicut, India", &eph).unwrap();
    let there = create_chart("A", at(1991, 6, 18, 7, 10), "New York, USA", &eph).unwrap();
    assert_eq!(here.chart(), there.chart());
    assert_ne!(here.respond("birth"), there.respond("birth"));
}

#[test]
fn out_of_range_birth_fails_whole_construction() {
    let eph = AnalyticEphemeris::new();
    let err = create_chart("A", at(1750, 5, 1, 10, 0), "Delhi", &eph).unwrap_err();
    assert!(matches!(
        err,
        ChartError::EphemerisUnavailable(EphemerisError::OutOfRange { .. })
    ));
}

#[test]
fn respond_is_total() {
    let eph = AnalyticEphemeris::new();
    let analyzer = create_chart("Meera", at(1991, 6, 18, 7, 10), "Kochi", &eph).unwrap();
    let queries = [
        "",
        " ",
        "xyz",
        "SUN",
        "moon phase",
        "list planets",
        "birth",
        "aspects please",
        "日本語",
        "☀️",
        "\n\t",
        "hi sun",
        "HeLLo",
    ];
    for query in queries {
        let reply = analyzer.respond(query);
        assert!(!reply.is_empty(), "empty reply for {query:?}");
    }
    assert_eq!(analyzer.respond("What are my planets?").lines().count(), 9);
    assert_eq!(analyzer.respond("tell me the aspects").lines().count(), 36);
    assert!(analyzer.respond("hi sun").starts_with("Hello Meera!"));
    assert!(analyzer.respond("xyz").starts_with("I can help you"));
}
