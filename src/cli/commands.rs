//! CLI command implementations
//!
//! Each command loads the configuration, catalog, and alias table, reads
//! one request from stdin, and writes one response. Request handling lives
//! in `handle_*` functions so it can run without stdin.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::args::Command;
use super::config::Config;
use super::errors::CliResult;
use super::io::{read_request, write_error, write_response};
use crate::alias::{normalize, AliasStore, AliasTableLoader};
use crate::catalog::{CatalogLoader, CatalogSet};
use crate::evidence::{EvidenceSpan, InMemoryRetriever};
use crate::explain::{DecisionExplainer, ObservedSnapshot};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::pipeline::{
    ComparisonPipeline, ComparisonRequest, InsurerSubmission, DEFAULT_DOMAIN,
};
use crate::universe::{LockClass, RawCoverageRow};

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub rows: Vec<RawCoverageRow>,
}

#[derive(Debug, Deserialize)]
pub struct RecallRequest {
    pub query: String,
    #[serde(default)]
    pub insurer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TypeEvidenceRequest {
    pub spans: Vec<EvidenceSpan>,
}

#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub insurer_id: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    pub query: String,
    #[serde(default)]
    pub spans: Vec<EvidenceSpan>,
}

#[derive(Debug, Deserialize)]
pub struct CompareInsurer {
    pub insurer_id: String,
    #[serde(default)]
    pub rows: Vec<RawCoverageRow>,
    #[serde(default)]
    pub spans: Vec<EvidenceSpan>,
    /// Simulates a failed evidence retrieval for this insurer
    #[serde(default)]
    pub retrieval_unavailable: bool,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub query: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    pub insurers: Vec<CompareInsurer>,
}

/// Everything a command needs after startup.
pub struct Context {
    pub config: Config,
    pub pipeline: ComparisonPipeline,
}

/// Loads config, catalog, and alias table.
pub fn load_context(config_path: &Path) -> CliResult<Context> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("path", config_path.display().to_string().as_str())],
    );

    let catalogs = match config.catalog_path() {
        Some(path) => CatalogLoader::load(&path)?,
        None => CatalogSet::builtin(),
    };
    let index = AliasTableLoader::load(&config.alias_table_path(), &catalogs)?;
    let pipeline = ComparisonPipeline::new(
        catalogs,
        Arc::new(AliasStore::new(index)),
        config.pipeline_settings()?,
    );

    Ok(Context { config, pipeline })
}

/// Parse CLI arguments and run the command. Errors are also written to
/// stdout as an error response.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let result = run_command(cli.command);
    if let Err(e) = &result {
        let _ = write_error(e.code_str(), e.message());
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Classify { config } => serve(&config, handle_classify),
        Command::Recall { config } => serve(&config, handle_recall),
        Command::TypeEvidence { config } => serve(&config, handle_type_evidence),
        Command::Decide { config } => serve(&config, handle_decide),
        Command::Compare { config } => serve(&config, handle_compare),
        Command::CheckConfig { config } => {
            let ctx = load_context(&config)?;
            write_response(handle_check_config(&ctx)?)
        }
    }
}

fn serve<R, F>(config_path: &Path, handler: F) -> CliResult<()>
where
    R: DeserializeOwned,
    F: FnOnce(&Context, R) -> CliResult<Value>,
{
    let ctx = load_context(config_path)?;
    let request: R = read_request()?;
    write_response(handler(&ctx, request)?)
}

pub fn handle_classify(ctx: &Context, request: ClassifyRequest) -> CliResult<Value> {
    let records = ctx.pipeline.classify(&request.rows);
    let count = |class: LockClass| records.iter().filter(|r| r.lock_class == class).count();

    Ok(json!({
        "summary": {
            "rows": records.len(),
            "universe_coverage": count(LockClass::UniverseCoverage),
            "non_universe_meta": count(LockClass::NonUniverseMeta),
            "unclassified": count(LockClass::Unclassified),
        },
        "records": records,
    }))
}

pub fn handle_recall(ctx: &Context, request: RecallRequest) -> CliResult<Value> {
    let index = ctx.pipeline.aliases().snapshot();
    let insurer = request.insurer_id.as_deref().unwrap_or("");
    let candidates = ctx.pipeline.recall(&index, insurer, &request.query);

    Ok(json!({
        "query": request.query,
        "normalized": normalize(&request.query),
        "candidates": candidates,
        "entries": index.entries_for(&request.query),
        "fingerprint": index.fingerprint(),
        "generation": index.generation(),
    }))
}

pub fn handle_type_evidence(ctx: &Context, request: TypeEvidenceRequest) -> CliResult<Value> {
    let typed = ctx.pipeline.typer().type_all(&request.spans);
    Ok(json!({ "typed": typed }))
}

pub fn handle_decide(ctx: &Context, request: DecideRequest) -> CliResult<Value> {
    let decision = ctx.pipeline.decide(
        &request.insurer_id,
        &request.domain,
        &request.query,
        &request.spans,
    )?;
    let index = ctx.pipeline.aliases().snapshot();
    let explanation = DecisionExplainer::new().explain(
        ObservedSnapshot::new(index.fingerprint(), index.generation()),
        &decision,
    );

    Ok(json!({
        "decision": decision.record(),
        "explanation": explanation,
    }))
}

pub fn handle_compare(ctx: &Context, request: CompareRequest) -> CliResult<Value> {
    let mut retriever = InMemoryRetriever::new();
    let mut insurers = Vec::with_capacity(request.insurers.len());
    for insurer in request.insurers {
        if insurer.retrieval_unavailable {
            retriever.mark_unavailable(insurer.insurer_id.clone());
        }
        retriever.add_all(insurer.insurer_id.clone(), insurer.spans);
        insurers.push(InsurerSubmission {
            insurer_id: insurer.insurer_id,
            rows: insurer.rows,
        });
    }

    let report = ctx.pipeline.compare(
        &ComparisonRequest {
            query: request.query,
            domain: request.domain,
            insurers,
        },
        &retriever,
    )?;

    Ok(json!({
        "report": report,
        "metrics": ctx.pipeline.metrics().to_json(),
    }))
}

pub fn handle_check_config(ctx: &Context) -> CliResult<Value> {
    let catalogs = ctx.pipeline.catalogs();
    let index = ctx.pipeline.aliases().snapshot();

    Ok(json!({
        "config": {
            "alias_table": ctx.config.alias_table_path().display().to_string(),
            "catalog": ctx.config.catalog_path().map(|p| p.display().to_string()),
            "max_evidence_spans": ctx.config.max_evidence_spans,
            "required_slots": ctx.config.slots()?,
            "log_level": ctx.config.log_level,
        },
        "catalog": {
            "domains": catalogs.domains.keys().collect::<Vec<_>>(),
            "codes": catalogs.code_count(),
        },
        "alias_index": {
            "source": index.source(),
            "entries": index.entry_count(),
            "aliases": index.alias_count(),
            "fingerprint": index.fingerprint(),
            "built_at": index.built_at(),
            "generation": index.generation(),
        },
    }))
}
