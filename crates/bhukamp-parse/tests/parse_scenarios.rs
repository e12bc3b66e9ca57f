//! End-to-end parses of small but complete source files.

use approx::assert_relative_eq;
use bhukamp_models::registry::{NamedSource, SourceRegistry};
use bhukamp_models::types::{FaultType, FocalMech, SourceRegion, SourceType};
use bhukamp_parse::{parse_fault, parse_grid, FileRegistry, ParseReport};
use std::fs;
use tempfile::TempDir;

fn fault_source(records: &[&str]) -> NamedSource {
    let mut lines: Vec<String> = [
        "0",             // station count; bounds follow
        "24.6 50.0",
        "-125.0 -65.0",
        "760.0 2.0",     // site data
        "0. 1000.",      // distance filter
        "1",             // one period
        "0.0 0.0",       // period row, no epistemic gm block
        "curve.out",
        "19",
        "gm values",
        "1",
        "relation",
        "500. 25.",      // distance sampling
        "1",             // uncertainty block: single branch,
        "0.0",           // no aleatory spread
        "1.0",
        "0.0 0",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    lines.extend(records.iter().map(|s| s.to_string()));
    NamedSource::new(SourceRegion::Ca, SourceType::Fault, 1.0, "ca.char.in", lines)
}

#[test]
fn characteristic_fault_file_parses_to_single_bin() {
    let src = fault_source(&[
        "1 1 1 Elsinore",
        "6.5 0.002 1.0",
        "90. 12. 0.",
        "2",
        "33.0 -117.0",
        "33.2 -116.9",
    ]);
    let mut report = ParseReport::new(&src.name);
    let set = parse_fault(&src, &mut report).unwrap();

    assert_relative_eq!(set.r_max, 1000.0);
    assert_eq!(set.sources.len(), 1);
    let fs = &set.sources[0];
    assert_eq!(fs.name, "Elsinore");
    assert_eq!(fs.fault_type, FaultType::Ch);
    assert_eq!(fs.mech, FocalMech::StrikeSlip);
    assert!(!fs.floats);
    assert_eq!(fs.mfds.len(), 1);
    assert_eq!(fs.mfds[0].len(), 1);
    assert_relative_eq!(fs.mfds[0].mag(0), 6.5);
    assert_relative_eq!(fs.mfds[0].rate(0), 0.002);

    assert!(report.ok);
    assert_eq!(report.model_count, 1);
    assert_eq!(report.mfd_count, 1);
}

#[test]
fn degenerate_gr_record_becomes_floating_characteristic() {
    let src = fault_source(&[
        "2 2 1 Single Bin GR",
        "2.9 0.8 6.5 6.5 0.1 1.0",
        "50. 14. 1.",
        "2",
        "34.0 -118.0",
        "34.1 -117.9",
    ]);
    let mut report = ParseReport::new(&src.name);
    let set = parse_fault(&src, &mut report).unwrap();

    let fs = &set.sources[0];
    assert_eq!(fs.name, "Single Bin GR");
    assert_eq!(fs.fault_type, FaultType::Ch);
    assert!(fs.floats);
    assert_eq!(fs.mfds[0].len(), 1);
    assert_relative_eq!(fs.mfds[0].mag(0), 6.5);
    assert_relative_eq!(fs.mfds[0].rate(0), 10f64.powf(2.9 - 0.8 * 6.5));
}

#[test]
fn registry_backed_grid_parse() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("sources")).unwrap();
    fs::create_dir_all(dir.path().join("conf")).unwrap();
    fs::write(
        dir.path().join("manifest.json"),
        r#"[{"region": "wus", "type": "gridded", "weight": 1.0,
             "name": "wusmap.in", "path": "wusmap.in"}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("sources/wusmap.in"),
        concat!(
            "0\n24.6 50.0\n-125.0 -65.0\n760.0 2.0\n",
            "1 5.0 1.0 1.0\n",       // rupture tops
            "1.0 0.0 0.0\n",         // all strike-slip
            "10 1000\n",
            "40.0 40.1 0.1\n",
            "-112.1 -112.0 0.1\n",
            "0.8 5.0 7.0 0.1\n",
            "0 0 0 0.0\n",
            "../conf/wus.aa\n",
            "1.0 0\n",
        ),
    )
    .unwrap();
    let mut a_bytes = Vec::new();
    for v in [0.01f32, 0.02, 0.0, 0.04] {
        a_bytes.extend_from_slice(&v.to_le_bytes());
    }
    fs::write(dir.path().join("conf/wus.aa"), &a_bytes).unwrap();

    let reg = FileRegistry::open(&dir.path().join("manifest.json")).unwrap();
    let sources = reg.resolve(None, Some(SourceType::Gridded), None);
    assert_eq!(sources.len(), 1);

    let mut report = ParseReport::new(&sources[0].name);
    let set = parse_grid(&sources[0], &reg, None, &mut report).unwrap();
    assert_eq!(set.node_count(), 3);
    assert!(report.ok);
    assert!(set.border.is_some());
    // first node is the southwest corner, storage row 1 col 0
    assert_relative_eq!(set.locations()[0].lat, 40.0);
    assert_relative_eq!(set.locations()[0].lon, -112.1);
    assert_eq!(set.mfds()[0].len(), 20);
}
