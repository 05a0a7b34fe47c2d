//! Score a small signal history and print the interest report

use chrono::{TimeZone, Utc};

fn main() {
    let json = r#"[
        { "type": "choice", "target": "MATH", "value": 1.0, "context": "Mission: Fractions", "timestamp": 1709283600000 },
        { "type": "time", "target": "MATH", "value": 420.0, "context": "Life skills market", "timestamp": 1709370000000 },
        { "type": "effort", "target": "MATH", "value": 8.0, "context": "Simulation round", "timestamp": 1709456400000 },
        { "type": "emotion", "target": "MATH", "value": 0.9, "context": "Question of the day", "timestamp": 1709542800000 },
        { "type": "time", "target": "ART", "value": 300.0, "timestamp": 1709542800000 }
    ]"#;

    let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();

    match sprout_insight::signals_to_interest_json(json, "MATH", now) {
        Ok(report) => println!("{report}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
