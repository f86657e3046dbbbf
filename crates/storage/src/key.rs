use uuid::Uuid;

/// Generate a fresh object key: `{prefix}{uuid-v4}{extension}`
pub fn object_key(prefix: &str, extension: &str) -> String {
    format!("{prefix}{}{extension}", Uuid::new_v4())
}
