use anyhow::{Context, Result};
use bytes::Bytes;
use emojiflux_bucket::{BucketError, BucketStore, S3BucketStore, S3Config};
use uuid::Uuid;

const REQUIRED_VARS: &[&str] = &[
    "EMOJIFLUX_TEST_S3_BUCKET",
    "EMOJIFLUX_TEST_S3_ENDPOINT",
    "EMOJIFLUX_TEST_S3_ACCESS_KEY_ID",
    "EMOJIFLUX_TEST_S3_SECRET_ACCESS_KEY",
];

#[tokio::test]
async fn s3_bucket_store_put_then_get() -> Result<()> {
    let Some(config) = s3_config_from_env() else {
        eprintln!(
            "Skipping S3 bucket store test; set {} to enable",
            REQUIRED_VARS.join(", ")
        );
        return Ok(());
    };

    let store = S3BucketStore::new(config)
        .await
        .context("failed to build S3 bucket store")?;
    let key = format!("emojiflux-test/{}.json", Uuid::new_v4());
    let payload = Bytes::from_static(br#"[{"name":"FIRE","score":1.0}]"#);

    store
        .put_object(&key, payload.clone(), "application/json")
        .await
        .context("upload to S3 failed")?;

    let object = store.get_object(&key).await.context("download failed")?;
    assert_eq!(object.bytes, payload);
    assert!(object.last_modified.is_some());

    let missing = store
        .get_object(&format!("emojiflux-test/{}.json", Uuid::new_v4()))
        .await;
    assert!(matches!(missing, Err(BucketError::NotFound(_))));

    Ok(())
}

fn s3_config_from_env() -> Option<S3Config> {
    for &var in REQUIRED_VARS {
        if std::env::var(var)
            .ok()
            .filter(|value| !value.is_empty())
            .is_none()
        {
            return None;
        }
    }

    Some(S3Config {
        bucket: std::env::var("EMOJIFLUX_TEST_S3_BUCKET").ok()?,
        region: std::env::var("EMOJIFLUX_TEST_S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        endpoint: std::env::var("EMOJIFLUX_TEST_S3_ENDPOINT").ok(),
        access_key_id: std::env::var("EMOJIFLUX_TEST_S3_ACCESS_KEY_ID").ok(),
        secret_access_key: std::env::var("EMOJIFLUX_TEST_S3_SECRET_ACCESS_KEY").ok(),
        force_path_style: true,
    })
}
