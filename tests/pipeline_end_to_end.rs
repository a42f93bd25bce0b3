//! Pipeline End-to-End Tests
//!
//! Tests for full comparison requests:
//! - Universe, recall, evidence, and resolution combine as expected
//! - The report carries the alias snapshot it ran against
//! - Retrieval failure degrades to undecided instead of failing
//! - Request validation errors

use covercanon::alias::{AliasStore, AliasTableLoader};
use covercanon::catalog::CatalogSet;
use covercanon::comparison::{ComparisonState, Guidance};
use covercanon::decision::DecisionStatus;
use covercanon::evidence::{EvidenceSpan, InMemoryRetriever};
use covercanon::explain::ExplanationType;
use covercanon::pipeline::{
    ComparisonPipeline, ComparisonRequest, InsurerSubmission, PipelineError, PipelineSettings,
    RequiredSlot,
};
use covercanon::universe::RawCoverageRow;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const QUERY: &str = "유사암진단비";
const DEFINITION: &str = "유사암은 갑상선암, 제자리암을 포함한다";

fn pipeline(dir: &TempDir) -> ComparisonPipeline {
    let path = dir.path().join("aliases.json");
    let table = json!({
        "source": "alias_master.xlsx",
        "entries": [
            {"alias": "유사암진단비", "canonical_code": "SIMILAR"},
            {"alias": "유사암 진단금", "canonical_code": "SIMILAR", "insurer_id": "B"},
            {"alias": "암진단비", "canonical_code": "GENERAL"},
            {"alias": "제자리암진단비", "canonical_code": "IN_SITU"},
        ]
    });
    fs::write(&path, table.to_string()).unwrap();

    let catalogs = CatalogSet::builtin();
    let index = AliasTableLoader::load(&path, &catalogs).unwrap();
    ComparisonPipeline::new(catalogs, Arc::new(AliasStore::new(index)), PipelineSettings::default())
}

fn submission(insurer: &str, rows: &[(&str, Option<&str>)]) -> InsurerSubmission {
    InsurerSubmission {
        insurer_id: insurer.to_string(),
        rows: rows
            .iter()
            .enumerate()
            .map(|(i, (name, amount))| RawCoverageRow::new(insurer, i as u32, *name, *amount))
            .collect(),
    }
}

fn request(insurers: Vec<InsurerSubmission>) -> ComparisonRequest {
    ComparisonRequest {
        query: QUERY.to_string(),
        domain: "CANCER".to_string(),
        insurers,
    }
}

fn retriever(entries: &[(&str, &str)]) -> InMemoryRetriever {
    let mut retriever = InMemoryRetriever::new();
    for (insurer, text) in entries {
        retriever.add(*insurer, EvidenceSpan::policy(format!("terms-{}", insurer), 12, *text));
    }
    retriever
}

// =============================================================================
// Outcome Tests
// =============================================================================

/// Two insurers with the coverage, matching evidence, and amounts: comparable.
#[test]
fn test_comparable_end_to_end() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir);
    let req = request(vec![
        submission("A", &[("피보험자", None), ("유사암진단비", Some("600만원"))]),
        submission("B", &[("유사암 진단금", Some("1,000만원"))]),
    ]);

    let report = pipeline
        .compare(&req, &retriever(&[("A", DEFINITION), ("B", DEFINITION)]))
        .unwrap();

    assert_eq!(report.outcome.state, ComparisonState::Comparable);
    assert_eq!(report.decisions.len(), 2);
    assert!(report.decisions.iter().all(|d| d.status == DecisionStatus::Decided));
    assert!(report.universe.iter().all(|u| u.in_universe));
    assert_eq!(report.universe[0].matched_row.as_ref().unwrap().row_index, 1);
    assert_eq!(report.explanation.explanation_type, ExplanationType::ComparisonResolution);
    assert_eq!(report.decision_explanations.len(), 2);
}

/// An insurer whose proposal lacks the coverage: out_of_universe.
#[test]
fn test_out_of_universe_end_to_end() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir);
    let req = request(vec![
        submission("A", &[("유사암진단비", Some("600만원"))]),
        submission("B", &[("유사암 진단금", Some("1,000만원"))]),
        submission("C", &[("암진단비", Some("3,000만원")), ("계약자", None)]),
    ]);

    let report = pipeline
        .compare(&req, &retriever(&[("A", DEFINITION), ("B", DEFINITION), ("C", DEFINITION)]))
        .unwrap();

    assert_eq!(report.outcome.state, ComparisonState::OutOfUniverse);
    assert!(!report.universe[2].in_universe);
    assert_eq!(report.universe[2].missing_slots, vec![RequiredSlot::Amount]);
}

/// No evidence for B: undecided.
#[test]
fn test_missing_evidence_end_to_end() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir);
    let req = request(vec![
        submission("A", &[("유사암진단비", Some("600만원"))]),
        submission("B", &[("유사암 진단금", Some("1,000만원"))]),
    ]);

    let report = pipeline.compare(&req, &retriever(&[("A", DEFINITION)])).unwrap();

    assert_eq!(report.outcome.state, ComparisonState::Undecided);
    assert_eq!(report.decisions[1].status, DecisionStatus::Undecided);
}

/// A failing evidence source is reported, not raised.
#[test]
fn test_retrieval_failure_degrades() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir);
    let req = request(vec![
        submission("A", &[("유사암진단비", Some("600만원"))]),
        submission("B", &[("유사암 진단금", Some("1,000만원"))]),
    ]);
    let mut source = retriever(&[("A", DEFINITION), ("B", DEFINITION)]);
    source.mark_unavailable("B");

    let report = pipeline.compare(&req, &source).unwrap();

    assert_eq!(report.outcome.state, ComparisonState::Undecided);
    assert!(report.universe[1].retrieval_unavailable);
    assert!(report
        .outcome
        .guidance
        .iter()
        .any(|g| g.insurer_id == "B" && g.guidance == Guidance::RetrievalUnavailable));
    assert_eq!(pipeline.metrics().snapshot().retrieval_degradations, 1);
}

/// A required category missing from the matched row leaves a gap.
#[test]
fn test_missing_category_gives_gaps() {
    let dir = TempDir::new().unwrap();
    let base = pipeline(&dir);
    let settings = PipelineSettings {
        required_slots: vec![RequiredSlot::Amount, RequiredSlot::Category],
        ..PipelineSettings::default()
    };
    let pipeline = ComparisonPipeline::new(
        base.catalogs().clone(),
        Arc::new(AliasStore::new((*base.aliases().snapshot()).clone())),
        settings,
    );

    let mut a = submission("A", &[("유사암진단비", Some("600만원"))]);
    a.rows[0].category = Some("진단".to_string());
    let b = submission("B", &[("유사암 진단금", Some("1,000만원"))]);

    let report = pipeline
        .compare(&request(vec![a, b]), &retriever(&[("A", DEFINITION), ("B", DEFINITION)]))
        .unwrap();

    assert_eq!(report.outcome.state, ComparisonState::ComparableWithGaps);
    assert!(report.universe[0].missing_slots.is_empty());
    assert_eq!(report.universe[1].missing_slots, vec![RequiredSlot::Category]);
}

// =============================================================================
// Snapshot Tests
// =============================================================================

/// The report names the alias snapshot used; a reload changes it.
#[test]
fn test_report_tracks_alias_snapshot() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir);
    let req = request(vec![submission("A", &[("유사암진단비", Some("600만원"))])]);
    let source = retriever(&[("A", DEFINITION)]);

    let first = pipeline.compare(&req, &source).unwrap();
    assert_eq!(first.alias_generation, 1);
    assert_eq!(first.alias_fingerprint, pipeline.aliases().snapshot().fingerprint());

    let path = dir.path().join("aliases.json");
    fs::write(
        &path,
        json!({"entries": [{"alias": "유사암진단비", "canonical_code": "SIMILAR"}]}).to_string(),
    )
    .unwrap();
    pipeline.reload_aliases(&path).unwrap();

    let second = pipeline.compare(&req, &source).unwrap();
    assert_eq!(second.alias_generation, 2);
    assert_ne!(second.alias_fingerprint, first.alias_fingerprint);
    assert_ne!(second.request_id, first.request_id);
}

// =============================================================================
// Validation Tests
// =============================================================================

/// Unknown domains, empty queries, and duplicate insurers are rejected.
#[test]
fn test_request_validation() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir);
    let source = InMemoryRetriever::new();

    let mut req = request(vec![]);
    req.domain = "STROKE".to_string();
    assert!(matches!(
        pipeline.compare(&req, &source),
        Err(PipelineError::UnknownDomain(_))
    ));

    let mut req = request(vec![]);
    req.query = " · ".to_string();
    assert!(matches!(pipeline.compare(&req, &source), Err(PipelineError::EmptyQuery)));

    let req = request(vec![submission("A", &[]), submission("A", &[])]);
    assert!(matches!(
        pipeline.compare(&req, &source),
        Err(PipelineError::DuplicateInsurer(_))
    ));
}
