//! Exporter tests against an in-memory document source

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document, JavaScriptCodeWithScope};
use tokio_test::{assert_err, assert_ok};

use super::*;
use crate::error::ConnectionError;
use crate::frame::Value;

/// How the mock source fails, if at all
#[derive(Clone, Copy)]
enum Failure {
    None,
    /// `open_cursor` returns `NotConnected`
    Open,
    /// The cursor yields this many documents, then a network error
    AfterDocuments(usize),
}

struct MockSource {
    documents: Vec<Document>,
    failure: Failure,
    opened: Mutex<Vec<(String, String, u32)>>,
    closed: Arc<AtomicBool>,
}

impl MockSource {
    fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            failure: Failure::None,
            opened: Mutex::new(Vec::new()),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn failing(mut self, failure: Failure) -> Self {
        self.failure = failure;
        self
    }

    fn opened(&self) -> Vec<(String, String, u32)> {
        self.opened.lock().unwrap().clone()
    }
}

struct MockCursor {
    documents: std::vec::IntoIter<Document>,
    fail_after: Option<usize>,
    yielded: usize,
}

#[async_trait]
impl DocumentCursor for MockCursor {
    async fn next_document(&mut self) -> Result<Option<Document>> {
        if self.fail_after == Some(self.yielded) {
            let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset");
            return Err(mongodb::error::Error::from(io).into());
        }
        self.yielded += 1;
        Ok(self.documents.next())
    }
}

#[async_trait]
impl DocumentSource for MockSource {
    async fn open_cursor(
        &self,
        database: &str,
        collection: &str,
        batch_size: u32,
    ) -> Result<Box<dyn DocumentCursor>> {
        self.opened
            .lock()
            .unwrap()
            .push((database.to_string(), collection.to_string(), batch_size));

        let fail_after = match self.failure {
            Failure::Open => return Err(ConnectionError::NotConnected.into()),
            Failure::AfterDocuments(n) => Some(n),
            Failure::None => None,
        };

        Ok(Box::new(MockCursor {
            documents: self.documents.clone().into_iter(),
            fail_after,
            yielded: 0,
        }))
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn sequence(n: usize) -> Vec<Document> {
    (0..n)
        .map(|i| {
            let status = if i % 3 == 0 { "na" } else { "ok" };
            doc! { "_id": i as i64, "seq": i as i64, "status": status }
        })
        .collect()
}

fn exporter(documents: Vec<Document>) -> CollectionExporter<MockSource> {
    CollectionExporter::new(MockSource::new(documents), "shop")
}

fn export_error(err: MongoframeError) -> ExportError {
    match err {
        MongoframeError::Export(e) => e,
        other => panic!("expected export error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_row_count_is_independent_of_batch_size() {
    let baseline = assert_ok!(exporter(sequence(2500)).export("orders", None).await);
    assert_eq!(baseline.num_rows(), 2500);

    for batch_size in [1, 7, 999, 1000, 2500, 10_000] {
        let table = assert_ok!(
            exporter(sequence(2500))
                .with_batch_size(batch_size)
                .export("orders", None)
                .await
        );
        assert_eq!(table, baseline, "batch size {batch_size}");
    }
}

#[tokio::test]
async fn test_batches_become_fragments() {
    let exporter = exporter(sequence(2500));
    let (table, stats) = assert_ok!(exporter.export_with_stats("orders", None).await);

    assert_eq!(stats.fragment_rows, vec![1000, 1000, 500]);
    assert_eq!(stats.total_rows(), 2500);
    assert_eq!(table.num_rows(), 2500);
    assert_eq!(exporter.source().opened()[0].2, 1000);
}

#[tokio::test]
async fn test_exact_multiple_has_no_trailing_fragment() {
    let (_, stats) = assert_ok!(
        exporter(sequence(2000))
            .export_with_stats("orders", None)
            .await
    );
    assert_eq!(stats.fragment_rows, vec![1000, 1000]);
}

#[tokio::test]
async fn test_identifier_column_is_never_present() {
    let (with_id, stats) = assert_ok!(exporter(sequence(10)).export_with_stats("c", None).await);
    assert!(with_id.column_index("_id").is_none());
    assert!(stats.id_dropped);

    let without = vec![doc! { "name": "a" }, doc! { "name": "b" }];
    let (table, stats) = assert_ok!(exporter(without).export_with_stats("c", None).await);
    assert!(table.column_index("_id").is_none());
    assert!(!stats.id_dropped);
    assert_eq!(table.columns(), &["name"]);
}

#[tokio::test]
async fn test_sentinel_replaced_but_substrings_kept() {
    let docs = vec![doc! { "_id": 1, "status": "na", "name": "banana" }];
    let table = assert_ok!(exporter(docs).export("c", None).await);

    assert_eq!(table.get(0, "status"), Some(&None));
    assert_eq!(
        table.get(0, "name"),
        Some(&Some(Value::String("banana".into())))
    );
}

#[tokio::test]
async fn test_row_order_matches_cursor_order() {
    let table = assert_ok!(
        exporter(sequence(1234))
            .with_batch_size(100)
            .export("c", None)
            .await
    );

    let seq: Vec<i64> = table
        .column("seq")
        .unwrap()
        .map(|cell| match cell {
            Some(Value::Int(n)) => *n,
            other => panic!("unexpected cell {other:?}"),
        })
        .collect();
    assert_eq!(seq, (0..1234).collect::<Vec<i64>>());

    let missing = table.column("status").unwrap().filter(|c| c.is_none()).count();
    assert_eq!(missing, (0..1234).filter(|i| i % 3 == 0).count());
}

#[tokio::test]
async fn test_empty_collection_gives_empty_table() {
    let (table, stats) = assert_ok!(exporter(Vec::new()).export_with_stats("c", None).await);

    assert_eq!(table.num_rows(), 0);
    assert_eq!(table.num_columns(), 0);
    assert!(stats.fragment_rows.is_empty());
}

#[tokio::test]
async fn test_heterogeneous_documents_union_columns() {
    let docs = vec![
        doc! { "_id": 1, "a": 1 },
        doc! { "_id": 2, "b": true },
        doc! { "_id": 3, "a": 3, "c": { "x": 1 } },
    ];
    let table = assert_ok!(exporter(docs).with_batch_size(2).export("c", None).await);

    assert_eq!(table.columns(), &["a", "b", "c"]);
    assert_eq!(table.get(1, "a"), Some(&None));
    assert_eq!(table.get(1, "b"), Some(&Some(Value::Bool(true))));
    assert_eq!(table.get(0, "c"), Some(&None));
    assert_eq!(
        table.get(2, "c"),
        Some(&Some(Value::Document(vec![("x".into(), Value::Int(1))])))
    );
}

#[tokio::test]
async fn test_cursor_failure_on_second_batch() {
    let source = MockSource::new(sequence(2500)).failing(Failure::AfterDocuments(1500));
    let exporter = CollectionExporter::new(source, "shop");

    let err = export_error(assert_err!(exporter.export("orders", None).await));

    assert_eq!(err.kind(), ExportErrorKind::Query);
    assert_eq!(err.target(), "shop.orders");
    assert!(matches!(err.cause(), MongoframeError::MongoDb(_)));
    assert!(err.to_string().contains("mongo.io_error"));
}

#[tokio::test]
async fn test_source_is_closed_after_export() {
    let source = MockSource::new(sequence(5));
    let closed = Arc::clone(&source.closed);

    let (table, _) = assert_ok!(
        CollectionExporter::new(source, "shop")
            .export_and_close("orders", None)
            .await
    );
    assert_eq!(table.num_rows(), 5);
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_source_is_closed_after_failed_export() {
    let source = MockSource::new(sequence(1500)).failing(Failure::AfterDocuments(1200));
    let closed = Arc::clone(&source.closed);

    let err = export_error(assert_err!(
        CollectionExporter::new(source, "shop")
            .export_and_close("orders", None)
            .await
    ));
    assert_eq!(err.kind(), ExportErrorKind::Query);
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_connect_failure_is_wrapped_as_connection_error() {
    let mut config = Config::default();
    config.connection.uri = "not-a-uri".to_string();

    let Err(err) = CollectionExporter::connect(&config).await else {
        panic!("connecting to an invalid URI succeeded");
    };
    let err = export_error(err);

    assert_eq!(err.kind(), ExportErrorKind::Connection);
    assert_eq!(err.target(), "test");
    assert!(err.location().file().contains("exporter"));
    assert!(matches!(
        err.cause(),
        MongoframeError::Connection(ConnectionError::InvalidUri(_))
    ));
}

#[tokio::test]
async fn test_unconnected_source_is_connection_failure() {
    let source = MockSource::new(sequence(3)).failing(Failure::Open);
    let exporter = CollectionExporter::new(source, "shop");

    let err = export_error(assert_err!(exporter.export("orders", None).await));

    assert_eq!(err.kind(), ExportErrorKind::Connection);
    assert!(matches!(
        err.cause(),
        MongoframeError::Connection(ConnectionError::NotConnected)
    ));
}

#[tokio::test]
async fn test_unrepresentable_value_is_construction_failure() {
    let code = Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope {
        code: "function() {}".into(),
        scope: doc! {},
    });
    let mut docs = sequence(5);
    docs.push(doc! { "_id": 99, "hook": code });

    let err = export_error(assert_err!(exporter(docs).export("c", None).await));

    assert_eq!(err.kind(), ExportErrorKind::Construction);
    assert!(matches!(err.cause(), MongoframeError::Frame(_)));
}

#[tokio::test]
async fn test_database_resolution() {
    let exporter = exporter(sequence(1));

    assert_ok!(exporter.export("orders", None).await);
    assert_ok!(exporter.export("orders", Some("archive")).await);
    assert_ok!(exporter.export_default("users").await);

    let opened: Vec<(String, String)> = exporter
        .source()
        .opened()
        .into_iter()
        .map(|(db, coll, _)| (db, coll))
        .collect();
    assert_eq!(
        opened,
        vec![
            ("shop".to_string(), "orders".to_string()),
            ("archive".to_string(), "orders".to_string()),
            ("shop".to_string(), "users".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_export_config_is_applied() {
    let config = ExportConfig {
        batch_size: 2,
        sentinels: vec!["na".into(), "N/A".into()],
        id_field: "key".into(),
        progress: false,
    };
    let docs = vec![
        doc! { "key": "k1", "_id": 1, "v": "N/A" },
        doc! { "key": "k2", "_id": 2, "v": "na" },
        doc! { "key": "k3", "_id": 3, "v": "n/a" },
    ];
    let exporter = exporter(docs).with_export_config(&config);
    let (table, stats) = assert_ok!(exporter.export_with_stats("c", None).await);

    assert_eq!(exporter.batch_size(), 2);
    assert_eq!(stats.fragment_rows, vec![2, 1]);
    assert_eq!(table.columns(), &["v"]);
    assert!(stats.id_dropped);
    assert_eq!(stats.sentinels_replaced, 2);
    assert_eq!(table.get(2, "v"), Some(&Some(Value::String("n/a".into()))));
}

#[test]
fn test_zero_batch_size_is_clamped() {
    assert_eq!(exporter(Vec::new()).with_batch_size(0).batch_size(), 1);
}
