use chrono::{TimeZone, Utc};

const NAMES: &[&str] = &[
    "lower",
    "upper",
    "trim",
    "first",
    "firstLower",
    "firstUpper",
    "last",
    "lastLower",
    "lastUpper",
    "sanitize",
    "sanitizeLower",
    "sanitizeUpper",
    "short5",
    "short6",
    "short7",
    "timestampISO8601",
    "timestampYYYYMMDDHHMMSS",
    "environment.user",
    "environment.variable",
    "file.content",
    "file.exists",
];

pub(crate) fn is_lambda(name: &str) -> bool {
    NAMES.contains(&name)
}

/// Applies the fixed lambda `name` to the rendered section body, or returns
/// `None` when the name is not a lambda.
///
/// Lambdas never fail: a body that cannot be interpreted yields an empty
/// string (or `"false"` for `file.exists`).
pub(crate) fn apply(name: &str, body: &str) -> Option<String> {
    let result = match name {
        "lower" => body.to_lowercase(),
        "upper" => body.to_uppercase(),
        "trim" => body.trim().to_string(),
        "first" => first_token(body),
        "firstLower" => first_token(body).to_lowercase(),
        "firstUpper" => first_token(body).to_uppercase(),
        "last" => last_token(body),
        "lastLower" => last_token(body).to_lowercase(),
        "lastUpper" => last_token(body).to_uppercase(),
        "sanitize" => sanitize(body),
        "sanitizeLower" => sanitize(body).to_lowercase(),
        "sanitizeUpper" => sanitize(body).to_uppercase(),
        "short5" => shorten(body, 5),
        "short6" => shorten(body, 6),
        "short7" => shorten(body, 7),
        "timestampISO8601" => format_timestamp(body, "%Y-%m-%dT%H:%M:%S"),
        "timestampYYYYMMDDHHMMSS" => format_timestamp(body, "%Y%m%d%H%M%S"),
        "environment.user" => std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_default(),
        "environment.variable" => std::env::var(body.trim()).unwrap_or_default(),
        "file.content" => std::fs::read_to_string(body.trim()).unwrap_or_default(),
        "file.exists" => std::path::Path::new(body.trim()).exists().to_string(),
        _ => return None,
    };
    Some(result)
}

/// The prefix up to the first non-alphanumeric character.
fn first_token(value: &str) -> String {
    value
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// The suffix after the last non-alphanumeric character.
fn last_token(value: &str) -> String {
    match value.rfind(|c: char| !c.is_ascii_alphanumeric()) {
        Some(index) => value[index..].chars().skip(1).collect(),
        None => value.to_string(),
    }
}

fn sanitize(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

fn shorten(value: &str, length: usize) -> String {
    value.chars().take(length).collect()
}

fn format_timestamp(body: &str, format: &str) -> String {
    let Ok(millis) = body.trim().parse::<i64>() else {
        return String::new();
    };
    match Utc.timestamp_millis_opt(millis) {
        chrono::LocalResult::Single(time) => time.format(format).to_string(),
        _ => String::new(),
    }
}
