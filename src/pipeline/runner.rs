//! Comparison pipeline
//!
//! Runs one comparison request end to end against a single alias snapshot:
//! classify rows, locate the query in each insurer's universe, recall
//! candidates, retrieve and type evidence, decide, and resolve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use super::errors::{PipelineError, PipelineResult};
use super::membership::find_universe_row;
use super::slots::{missing_slots, RequiredSlot};
use crate::alias::{normalize, AliasIndex, AliasResult, AliasStore, CandidateSet};
use crate::catalog::{CanonicalCode, CatalogSet, DomainCatalog};
use crate::comparison::{ComparisonOutcome, ComparisonStateResolver, InsurerComparisonInput};
use crate::decision::{
    CanonicalDecisionEngine, Decision, DecisionRecord, DEFAULT_MAX_EVIDENCE_SPANS,
};
use crate::evidence::{retrieve_or_empty, EvidenceRetriever, EvidenceSpan, EvidenceTyper};
use crate::explain::{ComparisonExplainer, DecisionExplainer, Explanation, ObservedSnapshot};
use crate::observability::{
    log_event_with_fields, Event, MetricsRegistry, ObservationScope, Timer,
};
use crate::universe::{MetaRowClassifier, RawCoverageRow, RowRef, UniverseLockRecord};

/// Domain used when a request names none.
pub const DEFAULT_DOMAIN: &str = "CANCER";

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_evidence_spans: usize,
    pub required_slots: Vec<RequiredSlot>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_evidence_spans: DEFAULT_MAX_EVIDENCE_SPANS,
            required_slots: vec![RequiredSlot::Amount],
        }
    }
}

/// One insurer's extracted proposal rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurerSubmission {
    pub insurer_id: String,
    #[serde(default)]
    pub rows: Vec<RawCoverageRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub query: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    pub insurers: Vec<InsurerSubmission>,
}

/// Where the query landed in one insurer's universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsurerUniverse {
    pub insurer_id: String,
    pub in_universe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_row: Option<RowRef>,
    pub missing_slots: Vec<RequiredSlot>,
    pub retrieval_unavailable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub query: String,
    pub domain_id: String,
    pub alias_fingerprint: String,
    pub alias_generation: u64,
    pub outcome: ComparisonOutcome,
    pub universe: Vec<InsurerUniverse>,
    pub decisions: Vec<DecisionRecord>,
    pub explanation: Explanation,
    pub decision_explanations: Vec<Explanation>,
}

pub struct ComparisonPipeline {
    catalogs: CatalogSet,
    aliases: Arc<AliasStore>,
    classifier: MetaRowClassifier,
    typer: EvidenceTyper,
    engine: CanonicalDecisionEngine,
    resolver: ComparisonStateResolver,
    required_slots: Vec<RequiredSlot>,
    metrics: Arc<MetricsRegistry>,
}

impl ComparisonPipeline {
    pub fn new(catalogs: CatalogSet, aliases: Arc<AliasStore>, settings: PipelineSettings) -> Self {
        Self {
            catalogs,
            aliases,
            classifier: MetaRowClassifier::new(),
            typer: EvidenceTyper::standard(),
            engine: CanonicalDecisionEngine::new(settings.max_evidence_spans),
            resolver: ComparisonStateResolver::new(),
            required_slots: settings.required_slots,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Shares a metrics registry with the host.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn aliases(&self) -> &AliasStore {
        &self.aliases
    }

    pub fn catalogs(&self) -> &CatalogSet {
        &self.catalogs
    }

    pub fn typer(&self) -> &EvidenceTyper {
        &self.typer
    }

    /// Rebuilds the alias index from disk and publishes it.
    pub fn reload_aliases(&self, path: &Path) -> AliasResult<u64> {
        let generation = self.aliases.reload(path, &self.catalogs)?;
        self.metrics.increment_alias_swaps();
        Ok(generation)
    }

    /// Classifies rows and counts them per lock class.
    pub fn classify(&self, rows: &[RawCoverageRow]) -> Vec<UniverseLockRecord> {
        let records = self.classifier.classify(rows);
        let mut universe = 0usize;
        for record in &records {
            self.metrics.record_row(record.lock_class);
            if record.is_universe() {
                universe += 1;
            }
        }
        log_event_with_fields(
            Event::RowsClassified,
            &[
                ("rows", records.len().to_string().as_str()),
                ("universe", universe.to_string().as_str()),
            ],
        );
        records
    }

    /// Recalls candidates for one insurer from `index`.
    pub fn recall(&self, index: &AliasIndex, insurer_id: &str, text: &str) -> CandidateSet {
        let candidates = index.recall(text);
        self.metrics.record_recall(!candidates.is_empty());
        if candidates.is_empty() {
            log_event_with_fields(
                Event::RecallMiss,
                &[("insurer_id", insurer_id), ("text", text)],
            );
        }
        candidates
    }

    /// Decides one insurer from already retrieved spans.
    ///
    /// `query` names the coverage row; its catalog scope is the row scope.
    pub fn decide(
        &self,
        insurer_id: &str,
        domain: &str,
        query: &str,
        spans: &[EvidenceSpan],
    ) -> PipelineResult<Decision> {
        let catalog = self.catalog(domain)?;
        let index = self.aliases.snapshot();
        let candidates = self.recall(&index, insurer_id, query);
        let row_scope = catalog.row_scope(query);
        Ok(self.decide_with(insurer_id, catalog, row_scope, candidates, spans))
    }

    /// Runs a full comparison request.
    pub fn compare(
        &self,
        request: &ComparisonRequest,
        retriever: &dyn EvidenceRetriever,
    ) -> PipelineResult<ComparisonReport> {
        if normalize(&request.query).is_empty() {
            return Err(PipelineError::EmptyQuery);
        }
        let catalog = self.catalog(&request.domain)?;
        let mut seen = BTreeSet::new();
        for submission in &request.insurers {
            if !seen.insert(submission.insurer_id.as_str()) {
                return Err(PipelineError::DuplicateInsurer(submission.insurer_id.clone()));
            }
        }

        let request_id = Uuid::new_v4();
        let request_id_text = request_id.to_string();
        let timer = Timer::new();
        let scope = ObservationScope::with_fields(
            "COMPARISON",
            &[("request_id", request_id_text.as_str()), ("query", request.query.as_str())],
        );

        // One snapshot for the whole request.
        let index = self.aliases.snapshot();
        let query_recall = index.recall(&request.query);
        let keywords = catalog.keywords();

        let mut inputs = Vec::with_capacity(request.insurers.len());
        let mut universe = Vec::with_capacity(request.insurers.len());

        for submission in &request.insurers {
            let insurer_id = submission.insurer_id.as_str();
            let records = self.classify(&submission.rows);
            let matched = find_universe_row(
                &index,
                &request.query,
                &query_recall,
                &submission.rows,
                &records,
            );

            let recall_text = matched
                .map(|m| m.row.raw_name.as_str())
                .unwrap_or(request.query.as_str());
            let candidates = self.recall(&index, insurer_id, recall_text);

            let retrieved = retrieve_or_empty(retriever, insurer_id, &keywords);
            if let Some(err) = &retrieved.unavailable {
                self.metrics.increment_retrieval_degradations();
                log_event_with_fields(
                    Event::RetrievalDegraded,
                    &[("insurer_id", insurer_id), ("reason", err.to_string().as_str())],
                );
            }

            let row_scope = catalog.row_scope(recall_text);
            let decision =
                self.decide_with(insurer_id, catalog, row_scope, candidates, &retrieved.spans);

            let missing = match matched {
                Some(m) => missing_slots(&self.required_slots, m.row, m.record),
                None => self.required_slots.clone(),
            };

            universe.push(InsurerUniverse {
                insurer_id: insurer_id.to_string(),
                in_universe: matched.is_some(),
                matched_row: matched.map(|m| m.row.row_ref()),
                missing_slots: missing.clone(),
                retrieval_unavailable: retrieved.is_unavailable(),
            });

            let mut input =
                InsurerComparisonInput::new(decision, matched.is_some(), missing.is_empty());
            if retrieved.is_unavailable() {
                input = input.with_retrieval_unavailable();
            }
            inputs.push(input);
        }

        let outcome = self.resolver.resolve(&request.query, &inputs);
        self.metrics.record_outcome(outcome.state);
        log_event_with_fields(
            Event::ComparisonResolved,
            &[
                ("request_id", request_id_text.as_str()),
                ("state", outcome.state.as_str()),
                ("rule", outcome.matched_rule().unwrap_or("")),
                ("insurers", inputs.len().to_string().as_str()),
            ],
        );

        let snapshot = ObservedSnapshot::new(index.fingerprint(), index.generation());
        let explanation = ComparisonExplainer::new().explain(snapshot.clone(), &inputs, &outcome);
        let decision_explainer = DecisionExplainer::new();
        let decision_explanations = inputs
            .iter()
            .map(|i| decision_explainer.explain(snapshot.clone(), &i.decision))
            .collect();

        scope.complete_with_fields(&[
            ("state", outcome.state.as_str()),
            ("elapsed_ms", timer.elapsed_ms().as_str()),
        ]);

        Ok(ComparisonReport {
            request_id,
            generated_at: Utc::now(),
            query: request.query.clone(),
            domain_id: catalog.domain_id.clone(),
            alias_fingerprint: index.fingerprint().to_string(),
            alias_generation: index.generation(),
            decisions: inputs.iter().map(|i| i.decision.record()).collect(),
            outcome,
            universe,
            explanation,
            decision_explanations,
        })
    }

    fn catalog(&self, domain: &str) -> PipelineResult<&DomainCatalog> {
        self.catalogs
            .get(domain)
            .ok_or_else(|| PipelineError::UnknownDomain(domain.to_string()))
    }

    fn decide_with(
        &self,
        insurer_id: &str,
        catalog: &DomainCatalog,
        row_scope: Option<&CanonicalCode>,
        candidates: CandidateSet,
        spans: &[EvidenceSpan],
    ) -> Decision {
        let typed = self.typer.type_all(spans);
        let cap = self.engine.max_evidence_spans();
        if typed.len() > cap {
            self.metrics.increment_evidence_truncations();
            log_event_with_fields(
                Event::EvidenceTruncated,
                &[
                    ("insurer_id", insurer_id),
                    ("spans", typed.len().to_string().as_str()),
                    ("limit", cap.to_string().as_str()),
                ],
            );
        }

        let decision = self
            .engine
            .decide_in_scope(insurer_id, catalog, row_scope, candidates, &typed);
        self.metrics.record_decision(decision.is_decided());

        let codes: Vec<String> = decision.decided_codes().iter().map(|c| c.to_string()).collect();
        let event = if decision.is_decided() {
            Event::DecisionDecided
        } else {
            Event::DecisionUndecided
        };
        log_event_with_fields(
            event,
            &[
                ("insurer_id", insurer_id),
                ("domain_id", catalog.domain_id.as_str()),
                ("decision_method", decision.method().as_str()),
                ("decided_codes", codes.join(",").as_str()),
                ("evidence", decision.trace().len().to_string().as_str()),
            ],
        );
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasEntry;
    use crate::comparison::ComparisonState;
    use crate::evidence::InMemoryRetriever;

    fn pipeline() -> ComparisonPipeline {
        let index = AliasIndex::build(vec![
            AliasEntry::new("유사암진단비", "SIMILAR"),
            AliasEntry::new("암진단비", "GENERAL"),
        ])
        .unwrap();
        ComparisonPipeline::new(
            CatalogSet::builtin(),
            Arc::new(AliasStore::new(index)),
            PipelineSettings::default(),
        )
    }

    fn submission(insurer: &str, name: &str) -> InsurerSubmission {
        InsurerSubmission {
            insurer_id: insurer.into(),
            rows: vec![RawCoverageRow::new(insurer, 1, name, Some("600만원"))],
        }
    }

    #[test]
    fn test_rejects_unknown_domain() {
        let request = ComparisonRequest {
            query: "유사암진단비".into(),
            domain: "STROKE".into(),
            insurers: vec![],
        };
        let err = pipeline()
            .compare(&request, &InMemoryRetriever::new())
            .unwrap_err();
        assert_eq!(err.code(), "COVER_PIPELINE_UNKNOWN_DOMAIN");
    }

    #[test]
    fn test_rejects_empty_query_and_duplicates() {
        let p = pipeline();
        let empty = ComparisonRequest {
            query: " - ".into(),
            domain: DEFAULT_DOMAIN.into(),
            insurers: vec![],
        };
        assert_eq!(
            p.compare(&empty, &InMemoryRetriever::new()).unwrap_err(),
            PipelineError::EmptyQuery
        );

        let dup = ComparisonRequest {
            query: "유사암진단비".into(),
            domain: DEFAULT_DOMAIN.into(),
            insurers: vec![submission("A", "유사암진단비"), submission("A", "유사암진단비")],
        };
        assert!(matches!(
            p.compare(&dup, &InMemoryRetriever::new()),
            Err(PipelineError::DuplicateInsurer(_))
        ));
    }

    #[test]
    fn test_comparable_run() {
        let p = pipeline();
        let mut retriever = InMemoryRetriever::new();
        retriever.add("A", EvidenceSpan::policy("A-terms", 12, "유사암은 갑상선암을 포함한다"));
        retriever.add("B", EvidenceSpan::policy("B-terms", 8, "유사암이라 함은 다음을 말한다"));

        let request = ComparisonRequest {
            query: "유사암진단비".into(),
            domain: DEFAULT_DOMAIN.into(),
            insurers: vec![submission("A", "유사암진단비"), submission("B", "유사암 진단비")],
        };
        let report = p.compare(&request, &retriever).unwrap();

        assert_eq!(report.outcome.state, ComparisonState::Comparable);
        assert_eq!(report.alias_generation, 1);
        assert_eq!(report.decisions.len(), 2);
        assert!(report.universe.iter().all(|u| u.in_universe));
        assert_eq!(p.metrics().snapshot().outcomes_comparable, 1);
    }

    #[test]
    fn test_retrieval_failure_degrades_to_undecided() {
        let p = pipeline();
        let mut retriever = InMemoryRetriever::new();
        retriever.add("A", EvidenceSpan::policy("A-terms", 12, "유사암은 갑상선암을 포함한다"));
        retriever.mark_unavailable("B");

        let request = ComparisonRequest {
            query: "유사암진단비".into(),
            domain: DEFAULT_DOMAIN.into(),
            insurers: vec![submission("A", "유사암진단비"), submission("B", "유사암진단비")],
        };
        let report = p.compare(&request, &retriever).unwrap();

        assert_eq!(report.outcome.state, ComparisonState::Undecided);
        assert!(report.universe[1].retrieval_unavailable);
        assert_eq!(p.metrics().snapshot().retrieval_degradations, 1);
    }

    #[test]
    fn test_decide_single_insurer() {
        let decision = pipeline()
            .decide(
                "A",
                DEFAULT_DOMAIN,
                "유사암진단비",
                &[EvidenceSpan::policy("A-terms", 3, "유사암은 제자리암을 포함한다")],
            )
            .unwrap();
        assert!(decision.is_decided());
        assert_eq!(decision.candidates().len(), 1);
    }

    #[test]
    fn test_decide_reads_row_scope_from_query() {
        let spans = [EvidenceSpan::policy(
            "A-terms",
            7,
            "보험금 지급사유에서 유사암, 제자리암, 경계성종양은 제외한다",
        )];
        let p = pipeline();

        let general = p.decide("A", DEFAULT_DOMAIN, "암진단비(유사암제외)", &spans).unwrap();
        assert_eq!(general.decided_codes().len(), 1);
        assert_eq!(general.row_scope().map(|c| c.as_str()), Some("GENERAL"));
        assert_eq!(general.record().decided_codes[0].as_str(), "GENERAL");

        let similar = p.decide("A", DEFAULT_DOMAIN, "유사암진단비", &spans).unwrap();
        assert!(!similar.is_decided());
    }
}
