//! Records and journal entries survive closing and reopening the database.

use chrono::Utc;
use hub_core::{PublishJournal, PublishRecord, PublishStep};
use hub_db::HubDb;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[tokio::test]
async fn state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plughub.db");
    let path = path.to_str().unwrap();

    let record = PublishRecord {
        plugin_id: "weather_bot_0b8f7c2e".into(),
        plugin_name: "weather_bot".into(),
        plugin_author: "Alice".into(),
        plugin_version: "0.3.1".into(),
        pr_number: 42,
        created_at: Utc::now(),
    };

    {
        let db = HubDb::open_local(path).await.unwrap();
        db.save_record(&record).await.unwrap();
        db.record(
            &record.plugin_id,
            &PublishStep::PullRequestOpened { number: 42 },
        )
        .await
        .unwrap();
    }

    let db = HubDb::open_local(path).await.unwrap();
    let stored = db.get_record("weather_bot_0b8f7c2e").await.unwrap().unwrap();
    assert_eq!(stored.pr_number, 42);
    assert_eq!(stored.plugin_name, "weather_bot");
    assert_eq!(
        stored.created_at.timestamp(),
        record.created_at.timestamp()
    );
    assert_eq!(
        db.steps("weather_bot_0b8f7c2e").await.unwrap(),
        vec![PublishStep::PullRequestOpened { number: 42 }]
    );
}
