//! Case conversion helpers for Go and protobuf identifiers.

use heck::ToUpperCamelCase;

/// Go initialisms kept fully upper case inside camel case identifiers.
const COMMON_INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP",
    "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS", "TTL",
    "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
];

/// Lower camel case Go identifier from a snake case name, upper casing
/// known initialisms after the first word: `user_id` -> `userID`.
///
/// Always returns a valid identifier; names that would be empty or start
/// with a digit get a leading `_`.
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::new();

    for (i, word) in name.split('_').filter(|w| !w.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
            continue;
        }

        let upper = word.to_uppercase();
        if COMMON_INITIALISMS.contains(&upper.as_str()) {
            out.push_str(&upper);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(&chars.as_str().to_lowercase());
            }
        }
    }

    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }

    out
}

/// Go field name protoc generates for a message field: `user_id` -> `UserId`.
pub fn snake_to_camel_without_initialisms(name: &str) -> String {
    name.to_upper_camel_case()
}

/// `public-story` / `public_story` -> `publicstory`
pub fn go_package_name(name: &str) -> String {
    name.replace(['-', '_'], "")
}

/// `public-story` -> `public_story`
pub fn proto_name(name: &str) -> String {
    name.replace('-', "_")
}
