//! Structural checks on a built OpenAPI 2.0 document.
//!
//! Findings are reported, never fixed: the caller logs them after the document has
//! been written. Checks:
//! - every `{placeholder}` in a path has a matching `in: path` parameter
//! - every declared path parameter appears in the path template
//! - path parameters are required
//! - `operationId`s are unique across the document
//! - every path item has at least one operation
//! - `host` is not empty

use crate::extractor::placeholders;
use crate::openapi_builder::{OpenApiDocument, ParameterObject};
use std::collections::{HashMap, HashSet};

/// Validates `document` and returns one message per finding.
pub fn validate_document(document: &OpenApiDocument) -> Vec<String> {
    let mut findings = Vec::new();

    if document.host.trim().is_empty() {
        findings.push("'host' is empty".to_string());
    }

    let mut operation_ids: HashMap<&str, Vec<String>> = HashMap::new();

    for (url, path_item) in &document.paths {
        let mut operation_count = 0;
        let mut path_params: Vec<&ParameterObject> = path_item
            .parameters
            .iter()
            .flatten()
            .filter(|p| p.location == "path")
            .collect();

        for (method, operation) in path_item.operations() {
            operation_count += 1;
            operation_ids
                .entry(operation.operation_id.as_str())
                .or_default()
                .push(format!("{} {}", method.as_str(), url));
            path_params.extend(
                operation
                    .parameters
                    .iter()
                    .flatten()
                    .filter(|p| p.location == "path"),
            );
        }

        if operation_count == 0 {
            findings.push(format!("{}: path item has no operations", url));
        }

        let declared: HashSet<&str> = path_params.iter().map(|p| p.name.as_str()).collect();
        let templated = placeholders(url);

        for name in &templated {
            if !declared.contains(name) {
                findings.push(format!(
                    "{}: path parameter '{}' is not declared",
                    url, name
                ));
            }
        }

        for param in &path_params {
            if !templated.contains(&param.name.as_str()) {
                findings.push(format!(
                    "{}: parameter '{}' is declared in path but missing from the template",
                    url, param.name
                ));
            }
            if !param.required {
                findings.push(format!(
                    "{}: path parameter '{}' must be required",
                    url, param.name
                ));
            }
        }
    }

    let mut duplicates: Vec<_> = operation_ids
        .into_iter()
        .filter(|(_, uses)| uses.len() > 1)
        .collect();
    duplicates.sort();
    for (operation_id, uses) in duplicates {
        findings.push(format!(
            "operationId '{}' is used by {}",
            operation_id,
            uses.join(", ")
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{HttpMethod, Parameter, ParameterLocation, Route, RouteMethod};
    use crate::openapi_builder::build_document;

    fn route(url: &str, name: &str, method: HttpMethod, params: Vec<Parameter>) -> Route {
        let mut route = Route::new(url, name);
        let mut route_method = RouteMethod::new(method);
        for param in params {
            route_method.add_parameter(param);
        }
        route.add_method(route_method);
        route
    }

    #[test]
    fn test_valid_document_has_no_findings() {
        let routes = vec![
            route(
                "/users/{id}",
                "user_show",
                HttpMethod::Get,
                vec![Parameter::new("id", ParameterLocation::Path, true, "integer", "")],
            ),
            route("/users", "user_list", HttpMethod::Get, vec![]),
        ];
        let document = build_document(&routes, "localhost:8080", "/");

        assert!(validate_document(&document).is_empty());
    }

    #[test]
    fn test_undeclared_placeholder_is_reported() {
        let routes = vec![route("/users/{id}", "user_show", HttpMethod::Get, vec![])];
        let document = build_document(&routes, "localhost:8080", "/");

        let findings = validate_document(&document);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("'id' is not declared"));
    }

    #[test]
    fn test_optional_and_stray_path_parameters_are_reported() {
        let routes = vec![route(
            "/list/{page}",
            "list",
            HttpMethod::Get,
            vec![
                Parameter::new("page", ParameterLocation::Path, false, "string", "1"),
                Parameter::new("sort", ParameterLocation::Path, false, "string", "asc"),
            ],
        )];
        let document = build_document(&routes, "localhost:8080", "/");

        let findings = validate_document(&document);
        assert!(findings.iter().any(|f| f.contains("'page' must be required")));
        assert!(findings.iter().any(|f| f.contains("'sort' is declared in path")));
    }

    #[test]
    fn test_duplicate_operation_ids_are_reported() {
        let mut shared = Route::new("/a", "shared");
        shared.add_method(RouteMethod::new(HttpMethod::Get));
        shared.add_method(RouteMethod::new(HttpMethod::Post));
        let document = build_document(&[shared], "", "/");

        let findings = validate_document(&document);
        assert!(findings.contains(&"'host' is empty".to_string()));
        assert!(findings
            .iter()
            .any(|f| f == "operationId 'shared' is used by GET /a, POST /a"));
    }

    #[test]
    fn test_route_without_methods_is_reported() {
        let document = build_document(&[Route::new("/empty", "empty")], "localhost", "/");

        let findings = validate_document(&document);
        assert_eq!(findings, vec!["/empty: path item has no operations".to_string()]);
    }
}
