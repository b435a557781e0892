use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::domain::models::{FileToRelay, S3Event};

/// Picks the object to relay out of a notification. Only the first record is
/// used; `None` means there is nothing to do.
pub fn extract_file(event: &S3Event) -> Option<FileToRelay> {
    let record = event.records.first()?;

    if event.records.len() > 1 {
        warn!(
            "Notification carries {} records, ignoring all but the first",
            event.records.len()
        );
    }

    let Some(entity) = record.s3.as_ref() else {
        debug!("First record has no s3 entity, nothing to relay");
        return None;
    };

    let key = decode_object_key(&entity.object.key);
    debug!(
        "Extracted bucket: {}, key: {} (event: {})",
        entity.bucket.name,
        key,
        record.event_name.as_deref().unwrap_or("unknown")
    );

    Some(FileToRelay {
        bucket: entity.bucket.name.clone(),
        key,
    })
}

/// Object keys arrive form-urlencoded in S3 notifications.
pub fn decode_object_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
