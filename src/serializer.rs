//! Serialization module for converting OpenAPI documents to JSON or YAML text.
//!
//! This module provides functions to serialize OpenAPI documents into standard formats
//! and write them to files.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes an OpenAPI document to JSON, pretty printed with 2-space indentation.
///
/// # Example
///
/// ```
/// use route_extractor::openapi_builder::OpenApiBuilder;
/// use route_extractor::serializer::serialize_json;
///
/// let doc = OpenApiBuilder::new().build();
/// let json = serialize_json(&doc).unwrap();
/// assert!(json.contains("\"swagger\": \"2.0\""));
/// ```
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Serializes an OpenAPI document to YAML format.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Writes string content to a file, replacing any existing file.
///
/// Parent directories are created if they don't exist.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{HttpMethod, Parameter, ParameterLocation, Route, RouteMethod};
    use crate::openapi_builder::build_document;
    use tempfile::TempDir;

    fn create_test_document() -> OpenApiDocument {
        let mut route = Route::new("/users/{id}", "user_show");
        let mut method = RouteMethod::new(HttpMethod::Get);
        method.add_parameter(Parameter::new("id", ParameterLocation::Path, true, "integer", ""));
        route.add_method(method);
        build_document(&[route], "localhost:8080", "/api")
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_document()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["swagger"], "2.0");
        assert_eq!(parsed["host"], "localhost:8080");
        assert_eq!(parsed["basePath"], "/api");
        assert_eq!(parsed["produces"][0], "application/xml");
        assert_eq!(parsed["info"]["version"], "1.0.0");
        assert_eq!(parsed["paths"]["/users/{id}"]["get"]["operationId"], "user_show");
        assert_eq!(parsed["paths"]["/users/{id}"]["parameters"][0]["in"], "path");
    }

    #[test]
    fn test_serialize_json_top_level_key_order() {
        let json = serialize_json(&create_test_document()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<_> = parsed.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["swagger", "host", "basePath", "produces", "info", "paths"]);
    }

    #[test]
    fn test_serialize_json_uses_two_space_indent() {
        let json = serialize_json(&create_test_document()).unwrap();

        assert!(json.starts_with("{\n  \"swagger\": \"2.0\""));
        assert!(json.lines().count() > 5);
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.contains("swagger: '2.0'") || yaml.contains("swagger: \"2.0\""));
        assert!(yaml.contains("basePath: /api"));
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert!(parsed.get("paths").is_some());
    }

    #[test]
    fn test_roundtrip_json_serialization() {
        let doc = create_test_document();
        let json = serialize_json(&doc).unwrap();

        let deserialized: OpenApiDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.swagger, doc.swagger);
        assert_eq!(deserialized.base_path, doc.base_path);
        assert_eq!(deserialized.paths.len(), 1);
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("out").join("nested").join("result.json");

        write_to_file("content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "content");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("result.json");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new");
    }
}
