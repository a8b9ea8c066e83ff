use super::*;
use serde_json::{json, Value};
use shared::domain::{RawRow, ReportDescriptor};

fn catalog() -> Catalog {
    Catalog::reduce(&Ok(vec![
        ReportDescriptor {
            report_id: "r1".to_string(),
            report_name: "Open Cases".to_string(),
        },
        ReportDescriptor {
            report_id: "r2".to_string(),
            report_name: "Pipeline".to_string(),
        },
    ]))
}

fn column(field_name: &str) -> ColumnSpec {
    ColumnSpec {
        label: field_name.to_uppercase(),
        field_name: field_name.to_string(),
        kind: "text".to_string(),
    }
}

fn row(value: Value) -> RawRow {
    value.as_object().cloned().expect("object row")
}

fn result(rows: Vec<RawRow>, total_records: u64) -> ReportResult {
    ReportResult {
        columns: vec![column("name"), column("stage")],
        rows: Some(rows),
        total_records,
    }
}

#[test]
fn new_session_is_idle() {
    let session = SessionState::new();
    assert_eq!(session.view_state(), ViewState::Idle);
    assert!(!session.show_table());
    assert!(!session.show_no_data());
    assert_eq!(session.snapshot(), ReportSnapshot::default());
}

#[test]
fn select_resolves_name_and_starts_loading() {
    let mut session = SessionState::new();
    let ticket = session.select("r2", &catalog()).expect("fetch ticket");

    assert_eq!(ticket.report_id(), "r2");
    assert_eq!(session.selected_report_name(), "Pipeline");
    assert!(session.is_loading());
    assert_eq!(session.view_state(), ViewState::Loading);
    assert!(!session.show_table());
    assert!(!session.show_no_data());
}

#[test]
fn unknown_report_gets_empty_name() {
    let mut session = SessionState::new();
    let ticket = session.select("r9", &catalog());
    assert!(ticket.is_some());
    assert_eq!(session.selected_report_name(), "");
}

#[test]
fn populated_result_gets_positional_ids_and_payload_total() {
    let mut session = SessionState::new();
    let ticket = session.select("r1", &catalog()).expect("fetch ticket");
    let rows = vec![
        row(json!({ "name": "Acme", "stage": "Won" })),
        row(json!({ "name": "Acme", "stage": "Won" })),
    ];

    let disposition = session.complete(
        &ticket,
        Ok(Some(result(rows, 50))),
        StaleResponsePolicy::Discard,
    );

    assert_eq!(disposition, FetchDisposition::Applied);
    let ids: Vec<_> = session.report_data().iter().map(ReportRow::id).collect();
    assert_eq!(ids, vec!["row-0", "row-1"]);
    assert_eq!(session.report_data()[1].get("stage"), Some(&json!("Won")));
    assert_eq!(session.table_columns().len(), 2);
    assert_eq!(session.total_records(), 50);
    assert_eq!(session.error_message(), None);
    assert_eq!(session.view_state(), ViewState::Populated);
    assert!(session.show_table());
    assert!(!session.show_no_data());
}

#[test]
fn empty_rows_are_informational_not_errors() {
    let mut session = SessionState::new();
    let ticket = session.select("r1", &catalog()).expect("fetch ticket");

    session.complete(
        &ticket,
        Ok(Some(result(Vec::new(), 12))),
        StaleResponsePolicy::Discard,
    );

    assert!(session.report_data().is_empty());
    assert!(session.table_columns().is_empty());
    assert_eq!(session.total_records(), 0);
    assert_eq!(session.message(), Some(&SessionMessage::NoData));
    assert_eq!(session.error_message(), Some(NO_DATA_MESSAGE));
    assert_eq!(session.view_state(), ViewState::Empty);
    assert!(!session.show_table());
    assert!(session.show_no_data());
}

#[test]
fn null_result_and_missing_rows_count_as_empty() {
    for outcome in [
        Ok(None),
        Ok(Some(ReportResult {
            columns: vec![column("name")],
            rows: None,
            total_records: 3,
        })),
    ] {
        let mut session = SessionState::new();
        let ticket = session.select("r1", &catalog()).expect("fetch ticket");
        session.complete(&ticket, outcome, StaleResponsePolicy::Discard);
        assert_eq!(session.message(), Some(&SessionMessage::NoData));
        assert!(session.show_no_data());
    }
}

#[test]
fn failure_resets_results_and_surfaces_message() {
    let mut session = SessionState::new();
    let first = session.select("r1", &catalog()).expect("fetch ticket");
    session.complete(
        &first,
        Ok(Some(result(vec![row(json!({ "name": "Acme" }))], 1))),
        StaleResponsePolicy::Discard,
    );

    let second = session.select("r2", &catalog()).expect("fetch ticket");
    session.complete(
        &second,
        Err(ReportFailure::from_value(json!({ "body": { "message": "X" } }))),
        StaleResponsePolicy::Discard,
    );

    assert!(session.report_data().is_empty());
    assert!(session.table_columns().is_empty());
    assert_eq!(session.total_records(), 0);
    assert_eq!(session.error_message(), Some("X"));
    assert_eq!(session.view_state(), ViewState::Failed);
    assert!(!session.show_table());
    assert!(!session.show_no_data());
}

#[test]
fn failure_without_usable_message_falls_back_to_generic() {
    let mut session = SessionState::new();
    let ticket = session.select("r1", &catalog()).expect("fetch ticket");
    session.complete(
        &ticket,
        Err(ReportFailure::from_value(json!({}))),
        StaleResponsePolicy::Discard,
    );
    assert_eq!(
        session.error_message(),
        Some(shared::error::UNKNOWN_ERROR_MESSAGE)
    );
}

#[test]
fn clearing_selection_returns_to_idle() {
    let mut session = SessionState::new();
    let ticket = session.select("r1", &catalog()).expect("fetch ticket");
    session.complete(
        &ticket,
        Ok(Some(result(vec![row(json!({ "name": "Acme" }))], 1))),
        StaleResponsePolicy::Discard,
    );

    assert!(session.select("", &catalog()).is_none());
    assert_eq!(session.view_state(), ViewState::Idle);
    assert!(session.report_data().is_empty());
    assert!(session.table_columns().is_empty());
    assert_eq!(session.total_records(), 0);
    assert_eq!(session.error_message(), None);
    assert!(!session.is_loading());
    assert!(!session.show_no_data());
}

#[test]
fn stale_response_is_discarded_by_default_policy() {
    let mut session = SessionState::new();
    let older = session.select("r1", &catalog()).expect("older ticket");
    let newer = session.select("r2", &catalog()).expect("newer ticket");

    let disposition = session.complete(
        &older,
        Ok(Some(result(vec![row(json!({ "name": "old" }))], 1))),
        StaleResponsePolicy::Discard,
    );
    assert_eq!(disposition, FetchDisposition::Discarded);
    assert!(session.is_loading());
    assert!(session.report_data().is_empty());

    session.complete(
        &newer,
        Ok(Some(result(vec![row(json!({ "name": "new" }))], 1))),
        StaleResponsePolicy::Discard,
    );
    assert_eq!(session.selected_report_id(), "r2");
    assert_eq!(session.report_data()[0].get("name"), Some(&json!("new")));
}

#[test]
fn stale_response_overwrites_under_apply_policy() {
    let mut session = SessionState::new();
    let older = session.select("r1", &catalog()).expect("older ticket");
    let newer = session.select("r2", &catalog()).expect("newer ticket");

    session.complete(
        &newer,
        Ok(Some(result(vec![row(json!({ "name": "new" }))], 1))),
        StaleResponsePolicy::Apply,
    );
    let disposition = session.complete(
        &older,
        Ok(Some(result(vec![row(json!({ "name": "old" }))], 7))),
        StaleResponsePolicy::Apply,
    );

    assert_eq!(disposition, FetchDisposition::AppliedStale);
    assert_eq!(session.selected_report_id(), "r2");
    assert_eq!(session.report_data()[0].get("name"), Some(&json!("old")));
    assert_eq!(session.total_records(), 7);
}

#[test]
fn response_after_clearing_is_discarded() {
    let mut session = SessionState::new();
    let ticket = session.select("r1", &catalog()).expect("fetch ticket");
    session.select("", &catalog());

    let disposition = session.complete(&ticket, Ok(None), StaleResponsePolicy::Discard);
    assert_eq!(disposition, FetchDisposition::Discarded);
    assert_eq!(session.view_state(), ViewState::Idle);
}

#[test]
fn normalize_drops_duplicate_columns_and_backend_ids() {
    let table = normalize_result(ReportResult {
        columns: vec![column("name"), column("stage"), column("name")],
        rows: Some(vec![
            row(json!({ "id": "dup", "name": "a" })),
            row(json!({ "id": "dup", "name": "b" })),
        ]),
        total_records: 2,
    });

    let fields: Vec<_> = table.columns.iter().map(|c| c.field_name.as_str()).collect();
    assert_eq!(fields, vec!["name", "stage"]);
    assert_eq!(table.rows[0].id(), "row-0");
    assert_eq!(table.rows[1].id(), "row-1");
    assert!(table.rows.iter().all(|r| !r.fields().contains_key("id")));
}

#[test]
fn flags_are_never_both_set() {
    let outcomes: Vec<FetchOutcome> = vec![
        Ok(Some(result(vec![row(json!({ "name": "a" }))], 1))),
        Ok(Some(result(Vec::new(), 0))),
        Ok(None),
        Err(ReportFailure::text("Z")),
    ];

    for outcome in outcomes {
        let mut session = SessionState::new();
        assert!(!(session.show_table() && session.show_no_data()));
        let ticket = session.select("r1", &catalog()).expect("fetch ticket");
        assert!(!(session.show_table() && session.show_no_data()));
        session.complete(&ticket, outcome, StaleResponsePolicy::Discard);
        assert!(!(session.show_table() && session.show_no_data()));
        session.select("", &catalog());
        assert!(!(session.show_table() && session.show_no_data()));
    }
}

#[test]
fn snapshot_is_stable_without_changes() {
    let mut session = SessionState::new();
    let ticket = session.select("r1", &catalog()).expect("fetch ticket");
    session.complete(
        &ticket,
        Ok(Some(result(vec![row(json!({ "name": "a" }))], 4))),
        StaleResponsePolicy::Discard,
    );

    let first = session.snapshot();
    let second = session.snapshot();
    assert_eq!(first, second);
    assert_eq!(first.report_id, "r1");
    assert_eq!(first.report_name, "Open Cases");
    assert_eq!(first.total_records, 4);
}

#[test]
fn stale_policy_reads_snake_case() {
    let policy: StaleResponsePolicy = serde_json::from_value(json!("apply")).expect("policy");
    assert_eq!(policy, StaleResponsePolicy::Apply);
    assert_eq!(StaleResponsePolicy::default(), StaleResponsePolicy::Discard);
}
