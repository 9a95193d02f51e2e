//! End-to-end gate tests
//!
//! Each test feeds fixture files through parsing, splitting and the gate the
//! same way `apisurface check` does, then inspects the verdict.

use apisurface::config::{Config, ANNOTATION_SECTION, CLASSES_SECTION};
use apisurface::gate::{DriftSubject, POLICY_FAILURE_EXIT};
use apisurface::report::terminal::render;
use apisurface::{
    Baseline, ComplianceGate, FormatError, GateInput, PolicyFailure, SectionSplitter, Sections,
    SymbolId, Verdict,
};
use std::path::{Path, PathBuf};

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_path().join(name)).expect("fixture exists")
}

fn baseline() -> Baseline {
    Baseline::load(&fixtures_path().join("api-list.txt")).expect("baseline fixture")
}

fn split(name: &str) -> Sections {
    SectionSplitter::new(
        "Start-",
        vec![CLASSES_SECTION.to_string(), ANNOTATION_SECTION.to_string()],
    )
    .split_text(&fixture(name))
    .expect("report has every section")
}

fn evaluate(signature: &str, report: Option<&Sections>) -> Verdict {
    let baseline = baseline();
    ComplianceGate::from_config(&Config::default())
        .evaluate(GateInput {
            signature,
            baseline: &baseline,
            report,
            classes_baseline: None,
        })
        .expect("signature parses")
}

fn rendered(verdict: &Verdict) -> String {
    colored::control::set_override(false);
    let mut buf = Vec::new();
    render(verdict, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

// ============================================================================
// Passing runs
// ============================================================================

#[test]
fn test_unchanged_surface_with_clean_report_passes() {
    let report = split("report_clean.txt");
    let verdict = evaluate(&fixture("current.txt"), Some(&report));

    assert!(verdict.passed());
    assert_eq!(verdict.exit_code(), 0);
    assert_eq!(rendered(&verdict), "");
}

#[test]
fn test_parameter_renames_do_not_trip_the_gate() {
    let renamed = fixture("current.txt").replace("int zoneId", "int zone");
    let verdict = evaluate(&renamed, None);
    assert!(verdict.passed());
}

#[test]
fn test_new_overload_of_existing_method_passes() {
    let overloaded = fixture("current.txt").replace(
        "    method public boolean isConnected();\n",
        "    method public boolean isConnected();\n    method public boolean isConnected(int);\n",
    );
    assert_ne!(overloaded, fixture("current.txt"));
    assert!(evaluate(&overloaded, None).passed());
}

// ============================================================================
// Surface drift
// ============================================================================

#[test]
fn test_added_member_fails_with_new_listing() {
    let added = fixture("current.txt").replace(
        "    method public boolean isConnected();\n",
        "    method public boolean isConnected();\n    method public void disconnect();\n",
    );
    let verdict = evaluate(&added, None);

    assert_eq!(verdict.exit_code(), POLICY_FAILURE_EXIT);
    match &verdict.failures[..] {
        [PolicyFailure::SurfaceDrift {
            subject,
            baseline,
            diff,
            remediation,
        }] => {
            assert_eq!(*subject, DriftSubject::Members);
            assert!(baseline.ends_with("api-list.txt"));
            assert_eq!(
                diff.added,
                vec![SymbolId::from_qualified("android.car.Car.disconnect").unwrap()]
            );
            assert!(diff.removed.is_empty());
            assert!(remediation.contains("apisurface update-baseline"));
            assert!(remediation.contains("atest ApiSurfaceTest"));
        }
        other => panic!("unexpected failures {:?}", other),
    }

    let text = rendered(&verdict);
    assert!(text.contains("new:\n  android.car.Car.disconnect\n"));
    assert!(text.contains("deleted:\n  (none)\n"));
}

#[test]
fn test_removed_class_lists_every_member_as_deleted() {
    let text = fixture("current.txt");
    let start = text.find("  public final class CarInfoManager").unwrap();
    let end = start + text[start..].find("  }\n").unwrap() + "  }\n".len();
    let without = format!("{}{}", &text[..start], &text[end..]);

    let verdict = evaluate(&without, None);
    match &verdict.failures[..] {
        [PolicyFailure::SurfaceDrift { diff, .. }] => {
            assert!(diff.added.is_empty());
            let removed: Vec<&str> = diff.removed.iter().map(|s| s.as_str()).collect();
            assert_eq!(
                removed,
                vec![
                    "android.car.CarInfoManager.getManufacturer",
                    "android.car.CarInfoManager.getModel",
                ]
            );
        }
        other => panic!("unexpected failures {:?}", other),
    }
}

#[test]
fn test_class_drift_against_class_baseline() {
    let report = split("report.txt");
    let classes_file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(classes_file.path(), "android.car.Car\nandroid.car.CarInfoManager\n").unwrap();
    let classes = Baseline::load(classes_file.path()).unwrap();
    let baseline = baseline();

    let verdict = ComplianceGate::from_config(&Config::default())
        .evaluate(GateInput {
            signature: &fixture("current.txt"),
            baseline: &baseline,
            report: Some(&report),
            classes_baseline: Some(&classes),
        })
        .unwrap();

    // Class drift first, then the annotation violations from the same report
    assert_eq!(verdict.failures.len(), 2);
    match &verdict.failures[0] {
        PolicyFailure::SurfaceDrift { subject, diff, .. } => {
            assert_eq!(*subject, DriftSubject::Classes);
            assert_eq!(
                diff.added,
                vec![SymbolId::from_qualified("android.car.media.CarAudioManager").unwrap()]
            );
        }
        other => panic!("unexpected failure {:?}", other),
    }
    assert!(matches!(
        verdict.failures[1],
        PolicyFailure::AnnotationCompliance { .. }
    ));
}

// ============================================================================
// Annotation compliance
// ============================================================================

#[test]
fn test_annotation_violations_are_echoed_verbatim() {
    let report = split("report.txt");
    let verdict = evaluate(&fixture("current.txt"), Some(&report));

    assert_eq!(verdict.exit_code(), POLICY_FAILURE_EXIT);
    let expected: Vec<String> = fixture("report.txt")
        .lines()
        .skip_while(|l| *l != "Start-annotation-violations")
        .skip(1)
        .map(str::to_string)
        .collect();
    assert_eq!(expected.len(), 2);

    match &verdict.failures[..] {
        [PolicyFailure::AnnotationCompliance {
            violations,
            remediation,
        }] => {
            assert_eq!(violations, &expected);
            assert!(remediation.contains("docs/api-versioning.md"));
        }
        other => panic!("unexpected failures {:?}", other),
    }

    let text = rendered(&verdict);
    assert!(text.contains(&format!("{}\n{}\n", expected[0], expected[1])));
}

#[test]
fn test_missing_report_section_is_an_error() {
    let splitter = SectionSplitter::new(
        "Start-",
        vec![CLASSES_SECTION.to_string(), ANNOTATION_SECTION.to_string()],
    );
    let err = splitter
        .split_text("Start-classes\nandroid.car.Car\n")
        .unwrap_err();
    assert_eq!(err.marker, "Start-annotation-violations");
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn test_wrong_header_is_a_format_error() {
    let text = fixture("current.txt").replace("2.0", "3.0");
    let baseline = baseline();
    let result = ComplianceGate::from_config(&Config::default()).evaluate(GateInput {
        signature: &text,
        baseline: &baseline,
        report: None,
        classes_baseline: None,
    });
    assert!(matches!(result, Err(FormatError::UnsupportedHeader { .. })));
}

#[test]
fn test_missing_baseline_is_an_error() {
    let err = Baseline::load(Path::new("/nonexistent/api-list.txt")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/api-list.txt"));
}
