//! Integration tests for the size engine: store, base resolution and history end to end.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use size_engine::resolve::resolve_base;
use size_engine::types::{CompareTo, DiffChange, HistoryQuery, Resolution, Status};
use size_engine::{CommitRecordPayload, Config, Engine, FileMetric, MemoryRecordStore, RecordStore};

fn fixture_payload(branch: &str, sha: &str, size: u64) -> CommitRecordPayload {
  let json = format!(
    r#"{{
      "branch": "{branch}",
      "commitSha": "{sha}",
      "files": [
        {{"pattern": "dist/*.js", "path": "dist/main.js", "size": {size}, "compression": "gzip", "maxSize": 150}}
      ],
      "groups": [
        {{"pattern": "dist/*.js", "path": "dist/*.js", "size": {size}, "compression": "gzip"}}
      ]
    }}"#
  );
  serde_json::from_str(&json).unwrap()
}

fn ts(day: u32, hour: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
}

#[tokio::test]
async fn reingest_same_identity_keeps_one_record() {
  let store = Arc::new(MemoryRecordStore::new());
  let engine = Engine::with_defaults(store.clone());

  let first = engine
    .ingest_at("proj", &fixture_payload("main", "abc", 100), ts(1, 10))
    .await
    .unwrap();
  let second = engine
    .ingest_at("proj", &fixture_payload("main", "abc", 150), ts(1, 11))
    .await
    .unwrap();

  assert_eq!(store.len(), 1);
  assert_eq!(first.record.id, second.record.id);
  assert_eq!(second.record.files[0].size, 150);
  assert_eq!(second.record.creation_date, ts(1, 11));
}

#[tokio::test]
async fn previous_commit_is_always_strictly_older() {
  let store = MemoryRecordStore::new();
  for (i, h) in [8, 9, 10, 11].iter().enumerate() {
    store
      .upsert_by_identity("proj", &fixture_payload("main", &format!("c{i}"), 100), ts(2, *h))
      .await
      .unwrap();
  }
  let query = size_engine::types::ScopeQuery::new(None, "main", 10);
  let records = store.query_by_scope("proj", &query).await.unwrap();

  for record in &records {
    let base = resolve_base(&store, record, CompareTo::PreviousCommit).await.unwrap();
    if let Some(base) = base {
      assert!(base.creation_date < record.creation_date);
    } else {
      assert_eq!(record.commit_sha, "c0");
    }
  }
}

#[tokio::test]
async fn latest_commit_may_be_newer_than_the_record() {
  let store = MemoryRecordStore::new();
  let mut pr = fixture_payload("feature", "f1", 100);
  pr.base_branch = Some("main".into());
  let pr_record = store.upsert_by_identity("proj", &pr, ts(3, 9)).await.unwrap();
  store
    .upsert_by_identity("proj", &fixture_payload("main", "m-new", 90), ts(3, 12))
    .await
    .unwrap();

  let latest = resolve_base(&store, &pr_record, CompareTo::LatestCommit).await.unwrap().unwrap();
  assert_eq!(latest.commit_sha, "m-new");
  assert!(latest.creation_date > pr_record.creation_date);

  let previous = resolve_base(&store, &pr_record, CompareTo::PreviousCommit).await.unwrap();
  assert!(previous.is_none());
}

#[tokio::test]
async fn subprojects_never_share_a_base() {
  let store = MemoryRecordStore::new();
  store
    .upsert_by_identity("proj", &fixture_payload("main", "a", 100), ts(4, 8))
    .await
    .unwrap();
  let mut web = fixture_payload("main", "b", 100);
  web.sub_project = Some("web".into());
  let web_record = store.upsert_by_identity("proj", &web, ts(4, 9)).await.unwrap();

  let base = resolve_base(&store, &web_record, CompareTo::PreviousCommit).await.unwrap();
  assert!(base.is_none());
}

#[tokio::test]
async fn end_to_end_limit_failure_on_pull_request() {
  let store = Arc::new(MemoryRecordStore::new());
  let engine = Engine::with_defaults(store);
  engine
    .ingest_at("proj", &fixture_payload("main", "m1", 150), ts(5, 8))
    .await
    .unwrap();

  let mut pr = fixture_payload("feature", "f1", 200);
  pr.base_branch = Some("main".into());
  pr.pr_number = Some("12".into());
  let out = engine.ingest_at("proj", &pr, ts(5, 9)).await.unwrap();

  let file = &out.report.files[0];
  assert_eq!(file.diff.bytes, 50);
  assert_eq!(file.diff.percent, 33.33);
  assert_eq!(file.diff.change, DiffChange::Update);
  assert_eq!(file.status, Status::Fail);
  assert_eq!(out.report.status, Status::Fail);
  assert_eq!(out.report.groups[0].status, Status::Pass);
  assert!(out.report.metadata.link_to_report.is_none());
}

#[tokio::test]
async fn merge_to_trunk_auto_passes_despite_limit() {
  let store = Arc::new(MemoryRecordStore::new());
  let engine = Engine::with_defaults(store);
  engine
    .ingest_at("proj", &fixture_payload("main", "m1", 150), ts(6, 8))
    .await
    .unwrap();
  let out = engine
    .ingest_at("proj", &fixture_payload("main", "m2", 200), ts(6, 9))
    .await
    .unwrap();

  assert_eq!(out.report.files[0].status, Status::Fail);
  assert_eq!(out.report.status, Status::Pass);
}

#[tokio::test]
async fn history_buckets_by_day() {
  let store = Arc::new(MemoryRecordStore::new());
  let engine = Engine::new(
    Config {
      history_max_records: 100,
      app_domain: None,
    },
    store,
  );
  let start = ts(10, 0);
  for i in 0..6 {
    // One upload every ten hours, spread over three days.
    let at = start + Duration::hours(i * 10);
    engine
      .ingest_at("proj", &fixture_payload("main", &format!("s{i}"), 100 + i as u64), at)
      .await
      .unwrap();
  }

  let query = HistoryQuery {
    branch: "main".into(),
    resolution: Resolution::Days,
    ..HistoryQuery::default()
  };
  let days = engine.history("proj", &query).await.unwrap();
  let shas: Vec<_> = days.iter().map(|r| r.commit_sha.as_str()).collect();
  assert_eq!(shas, vec!["s5", "s4", "s2"]);

  let latest = engine
    .history(
      "proj",
      &HistoryQuery {
        latest: true,
        ..query.clone()
      },
    )
    .await
    .unwrap();
  assert_eq!(latest.len(), 1);
  assert_eq!(latest[0].commit_sha, "s5");

  let older = engine
    .history(
      "proj",
      &HistoryQuery {
        resolution: Resolution::All,
        older_than: Some(start + Duration::hours(20)),
        ..query
      },
    )
    .await
    .unwrap();
  let shas: Vec<_> = older.iter().map(|r| r.commit_sha.as_str()).collect();
  assert_eq!(shas, vec!["s1", "s0"]);
}

#[tokio::test]
async fn sub_projects_are_listed_sorted() {
  let store = Arc::new(MemoryRecordStore::new());
  let engine = Engine::with_defaults(store);
  for name in ["web", "admin"] {
    let mut payload = fixture_payload("main", "a", 1);
    payload.sub_project = Some(name.into());
    engine.ingest_at("proj", &payload, ts(7, 1)).await.unwrap();
  }
  engine.ingest_at("proj", &fixture_payload("main", "a", 1), ts(7, 1)).await.unwrap();

  let names = engine.sub_projects("proj").await.unwrap();
  assert_eq!(names, vec!["admin".to_string(), "web".to_string()]);
}

#[test]
fn empty_snapshots_produce_zero_stats() {
  let out = size_engine::diff::diff_snapshots(&[], &[]);
  assert_eq!(out.stats.curr_branch_size, 0);
  assert_eq!(out.stats.base_branch_size, 0);
  assert_eq!(out.stats.diff.bytes, 0);
  assert_eq!(out.stats.diff.percent, 0.0);
  assert_eq!(out.status, Status::Pass);
}

#[test]
fn report_json_is_deterministic() {
  let curr = vec![FileMetric::new("b.js", 3), FileMetric::new("a.js", 2)];
  let base = vec![FileMetric::new("a.js", 1), FileMetric::new("c.js", 4)];
  let json1 = serde_json::to_string(&size_engine::diff::diff_snapshots(&curr, &base)).unwrap();
  let reversed: Vec<_> = curr.iter().rev().cloned().collect();
  let json2 = serde_json::to_string(&size_engine::diff::diff_snapshots(&reversed, &base)).unwrap();
  assert_eq!(json1, json2);
}
