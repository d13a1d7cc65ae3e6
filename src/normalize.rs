//! Volatile-field normalizer.
//!
//! The remote store decorates every exported document with server-assigned
//! metadata (timestamps, audit fields, version counters). Stripping those
//! before anything lands in version control keeps diffs limited to changes
//! an operator actually made.

use serde_json::Value;

/// Top-level fields assigned by the remote store on every write.
///
/// Removed from each document before it is written to a trackable file.
/// `attributes` is never touched.
pub const VOLATILE_FIELDS: [&str; 7] = [
    "created_at",
    "created_by",
    "count",
    "managed",
    "updated_at",
    "updated_by",
    "version",
];

/// Remove the volatile fields from a document in place.
///
/// Idempotent: normalizing an already-normalized document is a no-op.
/// Non-object values are left unchanged.
pub fn normalize(doc: &mut Value) {
    if let Value::Object(map) = doc {
        for field in VOLATILE_FIELDS {
            map.remove(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_strips_volatile_fields() {
        let mut doc = json!({
            "type": "dashboard",
            "id": "a",
            "attributes": {"title": "Ops"},
            "created_at": "2025-01-01T00:00:00Z",
            "created_by": "u_1",
            "updated_at": "2025-02-01T00:00:00Z",
            "updated_by": "u_2",
            "version": "WzQ3LDFd",
            "managed": false,
            "count": 3,
        });

        normalize(&mut doc);

        assert_eq!(
            doc,
            json!({
                "type": "dashboard",
                "id": "a",
                "attributes": {"title": "Ops"},
            })
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut doc = json!({
            "type": "index-pattern",
            "id": "b",
            "attributes": {"title": "logs-*"},
            "version": "1",
        });

        normalize(&mut doc);
        let once = doc.clone();
        normalize(&mut doc);

        assert_eq!(doc, once);
    }

    #[test]
    fn test_normalize_never_touches_attributes() {
        // Volatile field names nested under attributes must survive.
        let mut doc = json!({
            "type": "lens",
            "id": "c",
            "attributes": {"version": 2, "managed": true, "count": 9},
        });

        normalize(&mut doc);

        assert_eq!(doc["attributes"]["version"], 2);
        assert_eq!(doc["attributes"]["managed"], true);
        assert_eq!(doc["attributes"]["count"], 9);
    }

    #[test]
    fn test_normalize_ignores_non_objects() {
        let mut doc = json!("not an object");
        normalize(&mut doc);
        assert_eq!(doc, json!("not an object"));
    }
}
