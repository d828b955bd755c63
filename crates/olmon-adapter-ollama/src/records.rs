//! Model records parsed from `/api/ps` and `/api/tags` bodies

use crate::scanner::{extract_array_of_strings, extract_int, extract_object_list, extract_string};
use olmon_core::{InstalledModelRecord, LoadedModelRecord};

/// Key holding the model array in both responses
const MODELS_KEY: &str = "models";

/// Parse one object from the `/api/ps` model array
pub fn parse_loaded_model(object: &str) -> LoadedModelRecord {
    LoadedModelRecord {
        name: extract_string(object, "name").to_string(),
        model_id: extract_string(object, "model").to_string(),
        digest: extract_string(object, "digest").to_string(),
        size_bytes: extract_int(object, "size"),
        expires_at: extract_string(object, "expires_at").to_string(),
        parent_model: extract_string(object, "parent_model").to_string(),
        format: extract_string(object, "format").to_string(),
        family: extract_string(object, "family").to_string(),
        families: extract_array_of_strings(object, "families"),
        parameter_size: extract_string(object, "parameter_size").to_string(),
        quantization_level: extract_string(object, "quantization_level").to_string(),
    }
}

/// Parse one object from the `/api/tags` model array
pub fn parse_installed_model(object: &str) -> InstalledModelRecord {
    InstalledModelRecord {
        name: extract_string(object, "name").to_string(),
        model_id: extract_string(object, "model").to_string(),
        digest: extract_string(object, "digest").to_string(),
        modified_at: extract_string(object, "modified_at").to_string(),
        size_bytes: extract_int(object, "size"),
    }
}

/// All named models in an `/api/ps` body
pub fn parse_running_response(body: &str) -> Vec<LoadedModelRecord> {
    extract_object_list(body, MODELS_KEY)
        .into_iter()
        .map(parse_loaded_model)
        .filter(|record| !record.name.is_empty())
        .collect()
}

/// All named models in an `/api/tags` body
pub fn parse_catalog_response(body: &str) -> Vec<InstalledModelRecord> {
    extract_object_list(body, MODELS_KEY)
        .into_iter()
        .map(parse_installed_model)
        .filter(|record| !record.name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PS_BODY: &str = r#"{"models":[{"name":"mistral:latest","model":"mistral:latest","size":5137025024,"digest":"2ae6f6dd7a3dd734790bbbf58b8909a606e0e7e97e94b7604e0aa7ae4490e6d8","details":{"parent_model":"","format":"gguf","family":"llama","families":["llama"],"parameter_size":"7.2B","quantization_level":"Q4_0"},"expires_at":"2024-06-04T14:38:31.83753-07:00","size_vram":5137025024},{"name":"","model":"ghost","size":1}]}"#;

    const TAGS_BODY: &str = r#"{"models":[{"name":"codellama:13b","model":"codellama:13b","modified_at":"2023-11-04T14:56:49.277302595-07:00","size":7365960935,"digest":"9f438cb9cd581fc025612d27f7c1a6669ff83a8bb0ed86c94fcf4c5440555697","details":{"format":"gguf","family":"llama","families":null,"parameter_size":"13B","quantization_level":"Q4_0"}},{"name":"llama3:latest","model":"llama3:latest","modified_at":"2023-12-07T09:32:18.757212583-08:00","size":3825819519,"digest":"fe938a131f40e6f6d40083c9f0f430a515233eb2edaa6d72eb85c50d64f2300e","details":{"format":"gguf","family":"llama","families":null,"parameter_size":"7B","quantization_level":"Q4_0"}}]}"#;

    #[test]
    fn test_parse_running_response() {
        let models = parse_running_response(PS_BODY);

        assert_eq!(models.len(), 1);
        let model = &models[0];
        assert_eq!(model.name, "mistral:latest");
        assert_eq!(model.model_id, "mistral:latest");
        assert_eq!(model.size_bytes, 5137025024);
        assert_eq!(model.expires_at, "2024-06-04T14:38:31.83753-07:00");
        assert_eq!(model.parent_model, "");
        assert_eq!(model.format, "gguf");
        assert_eq!(model.family, "llama");
        assert_eq!(model.parameter_size, "7.2B");
        assert_eq!(model.quantization_level, "Q4_0");
        assert!(model.digest.starts_with("2ae6f6dd"));
    }

    #[test]
    fn test_families() {
        let models = parse_running_response(PS_BODY);
        assert_eq!(models[0].families, vec!["llama"]);

        // The array scanner only accepts `"key":[` with no space after the colon
        let spaced = parse_loaded_model(r#"{"name": "a", "families": ["llama", "clip"]}"#);
        assert_eq!(spaced.name, "a");
        assert!(spaced.families.is_empty());
    }

    #[test]
    fn test_parse_catalog_response() {
        let models = parse_catalog_response(TAGS_BODY);

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "codellama:13b");
        assert_eq!(models[0].size_bytes, 7365960935);
        assert_eq!(models[0].modified_at, "2023-11-04T14:56:49.277302595-07:00");
        assert_eq!(models[1].name, "llama3:latest");
        assert_eq!(models[1].model_id, "llama3:latest");
    }

    #[test]
    fn test_empty_and_missing_arrays() {
        assert!(parse_running_response(r#"{"models":[]}"#).is_empty());
        assert!(parse_running_response("{}").is_empty());
        assert!(parse_catalog_response("").is_empty());
        assert!(parse_catalog_response(r#"{"models":[{"name":"a""#).is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let model = parse_installed_model(r#"{"name":"tiny"}"#);
        assert_eq!(model.name, "tiny");
        assert_eq!(model.size_bytes, 0);
        assert!(model.digest.is_empty());
    }
}
