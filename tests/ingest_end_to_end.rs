use moex_viewer::commands::{export, history, ingest};
use moex_viewer::config::BatchErrorPolicy;
use moex_viewer::{AppError, AppState, AttrValue, ErrorResponse, ViewerConfig};
use std::path::PathBuf;
use tempfile::TempDir;

const SECURITIES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<document>
  <data id="securities">
    <metadata>
      <columns>
        <column name="SECID" type="string" bytes="51" max_size="0" />
        <column name="REGNUMBER" type="string" />
        <column name="NAME" type="string" />
        <column name="EMITENT_TITLE" type="string" />
      </columns>
    </metadata>
    <rows>
      <row SECID="ABC" REGNUMBER="1-01-00001-A" NAME="AcmeCo" EMITENT_TITLE="Acme &quot;Holding&quot;" />
    </rows>
  </data>
  <data id="securities.cursor">
    <metadata>
      <columns>
        <column name="INDEX" type="int64" />
        <column name="TOTAL" type="int64" />
        <column name="PAGESIZE" type="int64" />
      </columns>
    </metadata>
    <rows>
      <row INDEX="0" TOTAL="1" PAGESIZE="100" />
    </rows>
  </data>
</document>"#;

const HISTORY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<document>
  <data id="history">
    <metadata>
      <columns>
        <column name="BOARDID" type="string" />
        <column name="TRADEDATE" type="date" />
        <column name="SECID" type="string" />
        <column name="NUMTRADES" type="int32" />
        <column name="OPEN" type="double" />
        <column name="CLOSE" type="double" />
      </columns>
    </metadata>
    <rows>
      <row BOARDID="TQBR" TRADEDATE="2020-01-01" SECID="ABC" NUMTRADES="42" OPEN="3.5" CLOSE="" />
      <row BOARDID="TQBR" TRADEDATE="2020-01-02" SECID="ZZZ" NUMTRADES="1" OPEN="1" CLOSE="1" />
    </rows>
  </data>
</document>"#;

fn write(dir: &TempDir, name: &str, xml: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, xml).unwrap();
    path
}

#[test]
fn test_securities_then_history_join() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::default();

    let summary = ingest::ingest_files(
        &state,
        vec![
            write(&dir, "securities.xml", SECURITIES_XML),
            write(&dir, "history.xml", HISTORY_XML),
        ],
    )
    .unwrap();

    assert_eq!(summary.documents, 2);
    assert_eq!(summary.history_added, 1);
    assert_eq!(summary.history_dropped, 1);
    assert!(summary.failures.is_empty());

    {
        let db = state.read_db();
        let entries = db.list_history_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].secid(), "ABC");
    }

    let rows = history::list_joined_rows(&state, None).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    let keys: Vec<&str> = row.keys().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "secid",
            "regnumber",
            "name",
            "emitent_title",
            "tradedate",
            "numtrades",
            "open",
            "close"
        ]
    );
    assert_eq!(row["name"], AttrValue::from("AcmeCo"));
    assert_eq!(row["emitent_title"], AttrValue::from("Acme \"Holding\""));
    assert_eq!(row["numtrades"], AttrValue::Integer(42));
    assert_eq!(row["open"], AttrValue::Float(3.5));
    assert_eq!(row["close"], AttrValue::from(""));

    let json = serde_json::to_value(&rows).unwrap();
    assert_eq!(json[0]["tradedate"], "2020-01-01");
    assert_eq!(json[0]["numtrades"], 42);

    let stats = history::get_database_stats(&state).unwrap();
    assert_eq!(stats.securities, 1);
    assert_eq!(stats.history_entries, 1);
}

#[test]
fn test_malformed_integer_rejects_document() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::default();
    let bad_history = HISTORY_XML.replace("NUMTRADES=\"42\"", "NUMTRADES=\"12x\"");

    let err = ingest::ingest_files(
        &state,
        vec![
            write(&dir, "securities.xml", SECURITIES_XML),
            write(&dir, "history.xml", &bad_history),
        ],
    )
    .unwrap_err();

    assert!(matches!(err, AppError::TypeCoercion { .. }));
    let response = ErrorResponse::from(&err);
    assert_eq!(response.code, "TYPE_COERCION_ERROR");

    let stats = history::get_database_stats(&state).unwrap();
    assert_eq!(stats.securities, 0);
    assert_eq!(stats.history_entries, 0);
}

#[test]
fn test_skip_document_policy() {
    let dir = tempfile::tempdir().unwrap();
    let config = ViewerConfig {
        on_error: BatchErrorPolicy::SkipDocument,
        ..ViewerConfig::default()
    };
    let state = AppState::new(config).unwrap();
    let unknown_kind = r#"<document><data id="marketdata"><rows /></data></document>"#;

    let summary = ingest::ingest_files(
        &state,
        vec![
            write(&dir, "securities.xml", SECURITIES_XML),
            write(&dir, "marketdata.xml", unknown_kind),
            write(&dir, "history.xml", HISTORY_XML),
        ],
    )
    .unwrap();

    assert_eq!(summary.documents, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].code, "UNRECOGNIZED_DATA_KIND");
    assert_eq!(history::get_database_stats(&state).unwrap().history_entries, 1);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::default();

    let err = ingest::ingest_files(&state, vec![dir.path().join("nope.xml")]).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(err.user_message(), "File not found");
}

#[test]
fn test_export_and_columns() {
    let dir = tempfile::tempdir().unwrap();
    let config = ViewerConfig {
        quote_escape: moex_viewer::xml::QuoteEscape::Legacy,
        ..ViewerConfig::default()
    };
    let state = AppState::new(config).unwrap();
    ingest::ingest_files(&state, vec![write(&dir, "securities.xml", SECURITIES_XML)]).unwrap();

    let rows = export::export_security_rows(&state).unwrap();
    assert_eq!(
        rows,
        vec![
            "<row secid=\"ABC\" regnumber=\"1-01-00001-A\" name=\"AcmeCo\" emitent_title=\"Acme &quotHolding&quot\" />"
                .to_string()
        ]
    );
    assert!(export::export_history_rows(&state).unwrap().is_empty());

    let columns = history::get_table_columns(&state, Some(vec!["secid".to_string(), "close".to_string()])).unwrap();
    assert_eq!(columns[0].header, "SECID");
    assert_eq!(columns[1].key, "close");

    assert!(history::list_joined_rows(&state, Some(vec![" ".to_string()])).is_err());
}
