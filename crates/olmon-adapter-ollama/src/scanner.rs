//! Key-based field scanner for service response bodies
//!
//! These functions search the raw body text for `"key":` patterns instead of
//! building a document tree. They tolerate any surrounding structure and never
//! fail; a missing or malformed field yields an empty or zero value.
//!
//! Known limitations:
//! - Escaped quotes inside string values end the value early.
//! - Brackets and braces inside string values are counted as structure.
//! - [`extract_array_of_strings`] stops at the first `]`, so nested arrays are
//!   cut short. Only [`extract_object_list`] tracks nesting depth.

/// Value of the first `"key":"..."` (or `"key": "..."`) pair
///
/// Returns `""` when the key is absent or the value is never closed.
pub fn extract_string<'a>(buf: &'a str, key: &str) -> &'a str {
    let compact = format!("\"{}\":\"", key);
    let spaced = format!("\"{}\": \"", key);

    let start = match buf.find(&compact) {
        Some(pos) => pos + compact.len(),
        None => match buf.find(&spaced) {
            Some(pos) => pos + spaced.len(),
            None => return "",
        },
    };

    match buf[start..].find('"') {
        Some(len) => &buf[start..start + len],
        None => "",
    }
}

/// Leading integer of the first `"key":` value
///
/// The value runs to the next `,` or `}`. Returns 0 when the key is absent,
/// the value is unterminated, has no digits, or overflows `i64`.
pub fn extract_int(buf: &str, key: &str) -> i64 {
    let needle = format!("\"{}\":", key);
    let Some(pos) = buf.find(&needle) else {
        return 0;
    };

    let rest = buf[pos + needle.len()..].trim_start_matches(|c: char| c.is_ascii_whitespace());
    match rest.find(|c: char| c == ',' || c == '}') {
        Some(end) => parse_leading_int(trim_ascii(&rest[..end])),
        None => 0,
    }
}

/// Quoted elements of the first `"key":[...]` array
///
/// Unquoted elements are skipped.
pub fn extract_array_of_strings(buf: &str, key: &str) -> Vec<String> {
    let needle = format!("\"{}\":[", key);
    let Some(pos) = buf.find(&needle) else {
        return Vec::new();
    };

    let start = pos + needle.len();
    let Some(len) = buf[start..].find(']') else {
        return Vec::new();
    };

    buf[start..start + len]
        .split(',')
        .map(trim_ascii)
        .filter(|item| item.len() >= 2 && item.starts_with('"') && item.ends_with('"'))
        .map(|item| item[1..item.len() - 1].to_string())
        .collect()
}

/// Raw text of each top-level object in the first `"key":[...]` array
///
/// The closing bracket is found by depth counting, so nested arrays inside the
/// objects are handled. An array that is never closed yields nothing.
pub fn extract_object_list<'a>(buf: &'a str, key: &str) -> Vec<&'a str> {
    let needle = format!("\"{}\":[", key);
    let Some(pos) = buf.find(&needle) else {
        return Vec::new();
    };

    let start = pos + needle.len();
    let Some(end) = matching_bracket(&buf[start..]) else {
        return Vec::new();
    };
    let array = &buf[start..start + end];

    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut object_start = 0;

    for (i, byte) in array.bytes().enumerate() {
        match byte {
            b'{' => {
                if depth == 0 {
                    object_start = i;
                }
                depth += 1;
            }
            // A stray closing brace at depth 0 is ignored
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    objects.push(&array[object_start..=i]);
                }
            }
            _ => {}
        }
    }

    objects
}

/// Offset of the `]` closing an array whose `[` was just consumed
fn matching_bracket(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, byte) in s.bytes().enumerate() {
        match byte {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Optional sign followed by digits, anything after is ignored
fn parse_leading_int(s: &str) -> i64 {
    let sign_len = usize::from(s.starts_with(|c: char| c == '+' || c == '-'));
    let digit_count = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digit_count == 0 {
        return 0;
    }
    s[..sign_len + digit_count].parse().unwrap_or(0)
}

fn trim_ascii(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PS_BODY: &str = r#"{"models":[{"name":"llama3:8b","model":"llama3:8b","size":5137025024,"digest":"365c0bd3c000","details":{"parent_model":"","format":"gguf","family":"llama","families":["llama"],"parameter_size":"8.0B","quantization_level":"Q4_0"},"expires_at":"2024-06-04T14:38:31.83753-07:00","size_vram":5137025024},{"name":"phi3:mini","model":"phi3:mini","size":2393232384,"digest":"4f2222927938","details":{"parent_model":"","format":"gguf","family":"phi3","families":["phi3","clip"],"parameter_size":"3.8B","quantization_level":"Q4_K_M"},"expires_at":"2024-06-04T14:40:00Z","size_vram":2393232384}]}"#;

    #[test]
    fn test_extract_string() {
        assert_eq!(extract_string(r#"{"name":"llama3:8b"}"#, "name"), "llama3:8b");
        assert_eq!(extract_string(r#"{"name": "llama3:8b"}"#, "name"), "llama3:8b");
        assert_eq!(extract_string(r#"{"other":"x"}"#, "name"), "");
        assert_eq!(extract_string(r#"{"name":"unterminated"#, "name"), "");
        assert_eq!(extract_string(r#"{"name":""}"#, "name"), "");
    }

    #[test]
    fn test_extract_string_prefers_compact_form() {
        let buf = r#"{"a": "spaced", "b":{"a":"compact"}}"#;
        assert_eq!(extract_string(buf, "a"), "compact");
    }

    #[test]
    fn test_extract_string_does_not_handle_escapes() {
        let buf = r#"{"name":"say \"hi\""}"#;
        assert_eq!(extract_string(buf, "name"), r"say \");
    }

    #[test]
    fn test_extract_string_key_boundaries() {
        let buf = r#"{"parent_model":"base","model":"child"}"#;
        assert_eq!(extract_string(buf, "model"), "child");
        assert_eq!(extract_string(buf, "parent_model"), "base");
    }

    #[test]
    fn test_extract_int() {
        assert_eq!(extract_int(r#"{"size":5137025024,"x":1}"#, "size"), 5137025024);
        assert_eq!(extract_int(r#"{"size": 42}"#, "size"), 42);
        assert_eq!(extract_int(r#"{"size":-7}"#, "size"), -7);
        assert_eq!(extract_int(r#"{"other":1}"#, "size"), 0);
    }

    #[test]
    fn test_extract_int_malformed() {
        // No terminator
        assert_eq!(extract_int(r#"{"size":123"#, "size"), 0);
        // No digits
        assert_eq!(extract_int(r#"{"size":"big"}"#, "size"), 0);
        assert_eq!(extract_int(r#"{"size":null}"#, "size"), 0);
        // Leading integer prefix only
        assert_eq!(extract_int(r#"{"size":12.75}"#, "size"), 12);
        assert_eq!(extract_int(r#"{"size":3e9}"#, "size"), 3);
        // Overflow
        assert_eq!(extract_int(r#"{"size":99999999999999999999}"#, "size"), 0);
    }

    #[test]
    fn test_extract_array_of_strings() {
        let buf = r#"{"families":["llama", "clip" ,"x"]}"#;
        assert_eq!(extract_array_of_strings(buf, "families"), vec!["llama", "clip", "x"]);

        let buf = r#"{"families":["llama",3,null,"clip"]}"#;
        assert_eq!(extract_array_of_strings(buf, "families"), vec!["llama", "clip"]);

        assert!(extract_array_of_strings(r#"{"families":[]}"#, "families").is_empty());
        assert!(extract_array_of_strings(r#"{"families":["a""#, "families").is_empty());
        assert!(extract_array_of_strings(r#"{"other":["a"]}"#, "families").is_empty());
    }

    #[test]
    fn test_extract_array_of_strings_stops_at_first_bracket() {
        let buf = r#"{"tags":[["inner"],"outer"]}"#;
        assert!(extract_array_of_strings(buf, "tags").is_empty());
    }

    #[test]
    fn test_extract_object_list() {
        let objects = extract_object_list(r#"{"models":[{"a":1},{"b":2}]}"#, "models");
        assert_eq!(objects, vec![r#"{"a":1}"#, r#"{"b":2}"#]);

        assert!(extract_object_list(r#"{"models":[]}"#, "models").is_empty());
        assert!(extract_object_list(r#"{"other":[{"a":1}]}"#, "models").is_empty());
    }

    #[test]
    fn test_extract_object_list_handles_nesting() {
        let objects = extract_object_list(PS_BODY, "models");
        assert_eq!(objects.len(), 2);
        assert!(objects[0].starts_with(r#"{"name":"llama3:8b""#));
        assert!(objects[0].ends_with(r#""size_vram":5137025024}"#));
        assert_eq!(extract_string(objects[1], "name"), "phi3:mini");
        assert_eq!(extract_array_of_strings(objects[1], "families"), vec!["phi3", "clip"]);
    }

    #[test]
    fn test_extract_object_list_truncated() {
        let truncated = &PS_BODY[..PS_BODY.len() - 10];
        assert!(extract_object_list(truncated, "models").is_empty());
        assert!(extract_object_list(r#"{"models":[{"name":"a"}"#, "models").is_empty());
    }

    #[test]
    fn test_extract_object_list_ignores_stray_braces() {
        let objects = extract_object_list(r#"{"models":[},{"a":1}]}"#, "models");
        assert_eq!(objects, vec![r#"{"a":1}"#]);
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("+15"), 15);
        assert_eq!(parse_leading_int("-"), 0);
        assert_eq!(parse_leading_int(""), 0);
        assert_eq!(parse_leading_int("9223372036854775807"), i64::MAX);
    }
}
