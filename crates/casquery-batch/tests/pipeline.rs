//! Integration tests for the batch pipeline.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;

use casquery_batch::{
    BatchError, BatchPipeline, PipelineOptions, RowStatus, run_batch, write_batch,
};
use casquery_model::{Casrn, Normalizer, SearchResult};
use casquery_registry::{Registry, RegistryError};
use csv::{ReaderBuilder, StringRecord, Writer};

/// Registry with fixed answers that counts lookups per CAS RN.
#[derive(Default)]
struct FakeRegistry {
    records: BTreeMap<String, SearchResult>,
    failing: Vec<String>,
    calls: RefCell<Vec<String>>,
}

impl FakeRegistry {
    fn pfas() -> Self {
        let mut registry = Self::default();
        registry.add("375-73-5", "Perfluorobutane sulfonic acid", "PFBS", "375-73-5");
        registry.add(
            "29420-49-3",
            "Perfluorobutanesulfonic acid, potassium salt",
            "PFBS potassium salt",
            "375-73-5",
        );
        registry.add("7440-66-6", "Zinc", "Zinc", "7440-66-6");
        registry
    }

    fn add(&mut self, cas: &str, systematic: &str, epa: &str, current: &str) {
        self.records.insert(
            cas.to_string(),
            SearchResult {
                cas_rn: casquery_model::normalize(cas).unwrap(),
                systematic_name: Some(systematic.to_string()),
                epa_name: Some(epa.to_string()),
                current_cas_number: current.to_string(),
                synonyms: None,
            },
        );
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Registry for FakeRegistry {
    fn lookup(
        &self,
        casrn: &Casrn,
        _include_synonyms: bool,
    ) -> casquery_registry::Result<Vec<SearchResult>> {
        self.calls.borrow_mut().push(casrn.to_string());
        if self.failing.iter().any(|f| f == casrn.as_str()) {
            return Err(RegistryError::Status {
                url: format!("http://srs.test/substance/cas/{casrn}"),
                status: 500,
            });
        }
        Ok(self.records.get(casrn.as_str()).cloned().into_iter().collect())
    }
}

fn reader(csv: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new().flexible(true).from_reader(csv.as_bytes())
}

fn run_in_memory(pipeline: &BatchPipeline<&FakeRegistry>, csv: &str) -> Vec<StringRecord> {
    let rows = pipeline.process(reader(csv), "cas_rn").unwrap();
    let headers = rows.headers().clone();
    let mut writer = Writer::from_writer(Vec::new());
    write_batch(&headers, rows, &mut writer, |_| {}).unwrap();
    let bytes = writer.into_inner().unwrap();
    ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes.as_slice())
        .records()
        .map(Result::unwrap)
        .collect()
}

#[test]
fn annotates_rows_in_input_order() {
    let registry = FakeRegistry::pfas();
    let pipeline = BatchPipeline::new(&registry, PipelineOptions::default());

    let records = run_in_memory(&pipeline, "sample_id,cas_rn\nS1,375735\nS2,29420493\n");

    assert_eq!(records.len(), 3);
    assert_eq!(
        records[0].iter().collect::<Vec<_>>(),
        vec![
            "sample_id",
            "cas_rn",
            "casquery_normalized",
            "casquery_resolved",
            "casquery_systematicName",
            "casquery_epaName",
            "casquery_status",
            "casquery_error",
        ]
    );
    assert_eq!(
        records[1].iter().collect::<Vec<_>>(),
        vec![
            "S1",
            "375735",
            "375-73-5",
            "375-73-5",
            "Perfluorobutane sulfonic acid",
            "PFBS",
            "success",
            "",
        ]
    );
    assert_eq!(records[2].get(0), Some("S2"));
    assert_eq!(records[2].get(2), Some("29420-49-3"));
    assert_eq!(records[2].get(3), Some("375-73-5"));
    assert_eq!(records[2].get(6), Some("success"));
}

#[test]
fn one_malformed_row_among_valid_rows() {
    let registry = FakeRegistry::pfas();
    let pipeline = BatchPipeline::new(&registry, PipelineOptions::default());
    let csv = "id,cas_rn\n1,375-73-5\n2,not a cas\n3,7440-66-6\n4,29420-49-3\n";

    let rows: Vec<_> = pipeline
        .process(reader(csv), "cas_rn")
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(rows.len(), 4);
    let failed: Vec<_> = rows
        .iter()
        .filter(|r| r.status == RowStatus::NormalizationFailed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].row, 2);
    assert_eq!(failed[0].raw, "not a cas");
    assert!(failed[0].error.as_deref().unwrap().contains("not a cas"));
    assert_eq!(
        rows.iter().filter(|r| r.status == RowStatus::Success).count(),
        3
    );
}

#[test]
fn failures_keep_partial_fields() {
    let mut registry = FakeRegistry::pfas();
    registry.failing.push("7440-66-6".to_string());
    let pipeline = BatchPipeline::new(&registry, PipelineOptions::default());

    let rows: Vec<_> = pipeline
        .process(reader("cas_rn\n7440666\n7732-18-5\n1234567\n"), "cas_rn")
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(rows[0].status, RowStatus::LookupFailed);
    assert_eq!(rows[0].normalized.as_ref().map(Casrn::as_str), Some("7440-66-6"));
    assert_eq!(rows[0].resolved, None);
    assert!(rows[0].error.as_deref().unwrap().contains("HTTP 500"));

    assert_eq!(rows[1].status, RowStatus::NotFound);
    assert_eq!(rows[1].normalized.as_ref().map(Casrn::as_str), Some("7732-18-5"));

    assert_eq!(rows[2].status, RowStatus::NormalizationFailed);
    assert_eq!(rows[2].normalized, None);
    assert!(rows[2].error.as_deref().unwrap().contains("check digit"));
}

#[test]
fn duplicates_are_looked_up_once() {
    let registry = FakeRegistry::pfas();
    let pipeline = BatchPipeline::new(&registry, PipelineOptions::default());

    let rows: Vec<_> = pipeline
        .process(
            reader("cas_rn\n375735\n375-73-5\n 375 73 5 \n7732-18-5\n7732185\n"),
            "cas_rn",
        )
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(registry.calls(), vec!["375-73-5", "7732-18-5"]);
    assert_eq!(pipeline.registry_lookups(), 2);
    assert_eq!(rows[0].resolved, rows[1].resolved);
    assert_eq!(rows[1].resolved, rows[2].resolved);
    assert_eq!(rows[3].status, RowStatus::NotFound);
    assert_eq!(rows[4].status, RowStatus::NotFound);
}

#[test]
fn without_dedupe_every_row_is_looked_up() {
    let registry = FakeRegistry::pfas();
    let options = PipelineOptions::default().with_dedupe(false);
    let pipeline = BatchPipeline::new(&registry, options);

    let rows: Vec<_> = pipeline
        .process(reader("cas_rn\n375735\n375-73-5\n"), "cas_rn")
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(registry.calls().len(), 2);
    assert_eq!(rows[0].resolved, rows[1].resolved);
}

#[test]
fn structural_normalizer_accepts_bad_check_digits() {
    let registry = FakeRegistry::pfas();
    let options = PipelineOptions::default().with_normalizer(Normalizer::structural());
    let pipeline = BatchPipeline::new(&registry, options);

    let rows: Vec<_> = pipeline
        .process(reader("cas_rn\n1234567\n"), "cas_rn")
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(rows[0].normalized.as_ref().map(Casrn::as_str), Some("1234-56-7"));
    assert_eq!(rows[0].status, RowStatus::NotFound);
}

#[test]
fn missing_column_is_reported_up_front() {
    let registry = FakeRegistry::pfas();
    let pipeline = BatchPipeline::new(&registry, PipelineOptions::default());

    let result = pipeline.process(reader("id,casrn\n1,50-00-0\n"), "cas_rn");

    match result {
        Err(BatchError::MissingColumn { column, available }) => {
            assert_eq!(column, "cas_rn");
            assert_eq!(available, "id, casrn");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected missing column error"),
    }
    assert!(registry.calls().is_empty());
}

#[test]
fn ragged_rows_are_still_emitted() {
    let registry = FakeRegistry::pfas();
    let pipeline = BatchPipeline::new(&registry, PipelineOptions::default());

    let records = run_in_memory(&pipeline, "id,cas_rn,note\nA\nB,7440-66-6,zinc,extra\n");

    assert_eq!(records.len(), 3);
    assert_eq!(records[1].len(), 9);
    assert_eq!(records[1].get(7), Some("normalization-failed"));
    assert_eq!(records[2].len(), 9);
    assert_eq!(records[2].get(2), Some("zinc"));
    assert_eq!(records[2].get(3), Some("7440-66-6"));
    assert_eq!(records[2].get(7), Some("lookup-failed"));
    assert!(records[2].get(8).unwrap().contains("extra"));
}

#[test]
fn extra_fields_survive_in_output() {
    let registry = FakeRegistry::pfas();
    let pipeline = BatchPipeline::new(&registry, PipelineOptions::default());

    let csv = "id,cas_rn\nA,7440-66-6,note-one,note-two\nB,375735\n";

    let records = run_in_memory(&pipeline, csv);

    let wide = records[1].iter().collect::<Vec<_>>().join(",");
    assert!(wide.contains("note-one"));
    assert!(wide.contains("note-two"));
    assert_eq!(records[1].get(0), Some("A"));
    assert_eq!(records[1].get(2), Some("7440-66-6"));
    assert_eq!(records[1].get(6), Some("lookup-failed"));
    assert_eq!(records[2].get(6), Some("success"));
    assert_eq!(registry.calls(), vec!["375-73-5"]);
}

#[test]
fn run_batch_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let output = dir.path().join("output.csv");
    fs::write(
        &input,
        "\u{feff}sample_id,cas_rn\nS1,375735\nS2,29420493\nS3,\nS4,\"7440,66,6\"\n",
    )
    .unwrap();

    let registry = FakeRegistry::pfas();
    let pipeline = BatchPipeline::new(&registry, PipelineOptions::default());
    let mut seen = Vec::new();
    let summary =
        run_batch(&pipeline, &input, "cas_rn", &output, |row| seen.push(row.row)).unwrap();

    assert_eq!(seen, vec![1, 2, 3, 4]);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.success, 3);
    assert_eq!(summary.normalization_failed, 1);
    assert_eq!(summary.registry_lookups, 3);

    let mut reader = ReaderBuilder::new().from_path(&output).unwrap();
    let rows: Vec<StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1].get(3), Some("375-73-5"));
    assert_eq!(rows[2].get(6), Some("normalization-failed"));
    assert_eq!(rows[3].get(2), Some("7440-66-6"));
}

#[test]
fn run_batch_reports_unreadable_input() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FakeRegistry::pfas();
    let pipeline = BatchPipeline::new(&registry, PipelineOptions::default());

    let err = run_batch(
        &pipeline,
        &dir.path().join("missing.csv"),
        "cas_rn",
        &dir.path().join("out.csv"),
        |_| {},
    )
    .unwrap_err();

    assert!(matches!(err, BatchError::Open { .. }));
}
