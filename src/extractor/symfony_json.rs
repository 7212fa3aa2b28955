use crate::error::{Error, Result};
use crate::extractor::{
    placeholders, ExtractionConfig, HttpMethod, Parameter, ParameterLocation, RouteExtractor,
};
use crate::pipeline::RouteSet;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Method token that stands for every supported verb
const ANY_METHOD: &str = "ANY";

/// Requirement regex that marks a parameter as an integer, compared case-insensitively
const INTEGER_PATTERN: &str = r"\\d+";

/// Imports the named-route map printed by `bin/console debug:router --format=json`.
///
/// Routes are identified by name: an entry whose name is already in the route set
/// updates that route in place, any other entry appends a new route.
pub struct SymfonyJsonImporter;

impl SymfonyJsonImporter {
    /// Reads and imports the route dump at `path`.
    ///
    /// A missing file is logged and leaves `routes` untouched.
    pub fn import_file(&self, path: &Path, routes: &mut RouteSet) -> Result<()> {
        info!("Parse symfony route dump: {}", path.display());

        if !path.exists() {
            warn!("Symfony route dump doesn't exist: {}", path.display());
            return Ok(());
        }

        let content = fs::read_to_string(path)?;
        let json: Value = serde_json::from_str(&content).map_err(|e| Error::InvalidJson {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let entries = json.as_object().ok_or_else(|| Error::InvalidJson {
            file: path.to_path_buf(),
            message: "top-level value is not an object".to_string(),
        })?;

        self.import(entries, routes);
        Ok(())
    }

    /// Imports every `name -> descriptor` entry in document order.
    pub fn import(&self, entries: &Map<String, Value>, routes: &mut RouteSet) {
        for (route_name, descriptor) in entries {
            match descriptor.as_object() {
                Some(descriptor) => Self::import_entry(route_name, descriptor, routes),
                None => warn!("Skipping route '{}': descriptor is not an object", route_name),
            }
        }
    }

    fn import_entry(route_name: &str, descriptor: &Map<String, Value>, routes: &mut RouteSet) {
        let Some(path) = descriptor.get("path").and_then(Value::as_str) else {
            warn!("Skipping route '{}': no path", route_name);
            return;
        };
        let url = path.replace("\\/", "/");

        let method_token = descriptor
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or(ANY_METHOD);
        let methods = expand_methods(method_token);

        let defaults = descriptor.get("defaults").and_then(Value::as_object);
        if defaults.is_none() {
            debug!("Route doesn't contain any default parameters: '{}'", url);
        }
        let requirements = descriptor.get("requirements").and_then(Value::as_object);
        if requirements.is_none() {
            debug!("Route doesn't contain any required parameters: '{}'", url);
        }

        let route = routes.find_or_insert_by_name(&url, route_name);

        for method in methods {
            let route_method = route.method_mut(method);

            for (key, value) in defaults.into_iter().flatten() {
                let default = literal(value);
                route_method.add_default_value(key.clone(), default.clone());
                route_method.add_parameter(Parameter::new(
                    key.clone(),
                    ParameterLocation::Form,
                    false,
                    "string",
                    default,
                ));
            }

            for (key, value) in requirements.into_iter().flatten() {
                debug!("Add route required parameter: {}, url: {}", key, url);
                let location = if url.contains(&format!("{{{}}}", key)) {
                    ParameterLocation::Path
                } else {
                    ParameterLocation::Form
                };
                route_method.add_parameter(Parameter::new(
                    key.clone(),
                    location,
                    true,
                    requirement_type(&literal(value)),
                    "",
                ));
            }

            for placeholder in placeholders(&url) {
                if route_method.has_parameter(placeholder) {
                    continue;
                }
                let param_type = if placeholder.to_lowercase().contains("id") {
                    "integer"
                } else {
                    "string"
                };
                route_method.add_parameter(Parameter::new(
                    placeholder,
                    ParameterLocation::Path,
                    true,
                    param_type,
                    "",
                ));
            }
        }
    }
}

impl RouteExtractor for SymfonyJsonImporter {
    fn name(&self) -> &'static str {
        "symfony-json"
    }

    fn is_active(&self, config: &ExtractionConfig) -> bool {
        config.symfony_json.is_some()
    }

    fn extract(&self, config: &ExtractionConfig, routes: &mut RouteSet) -> anyhow::Result<()> {
        if let Some(path) = &config.symfony_json {
            self.import_file(path, routes)?;
        }
        Ok(())
    }
}

/// Expands `ANY`, `GET|POST` or a single verb into the supported methods.
fn expand_methods(token: &str) -> Vec<HttpMethod> {
    if token.trim().eq_ignore_ascii_case(ANY_METHOD) || token.trim().is_empty() {
        return HttpMethod::ALL.to_vec();
    }

    let mut methods = Vec::new();
    for part in token.split('|') {
        match HttpMethod::parse(part) {
            Some(method) if !methods.contains(&method) => methods.push(method),
            Some(_) => {}
            None => warn!("Unsupported HTTP method '{}' skipped", part),
        }
    }
    methods
}

/// `"integer"` for the digit-plus requirement, `"string"` otherwise.
fn requirement_type(regex: &str) -> &'static str {
    if regex.to_lowercase() == INTEGER_PATTERN {
        "integer"
    } else {
        "string"
    }
}

/// Text of a JSON scalar as it would appear in a route definition.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Route;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn import(value: Value) -> RouteSet {
        let mut routes = RouteSet::new();
        SymfonyJsonImporter.import(value.as_object().unwrap(), &mut routes);
        routes
    }

    #[test]
    fn test_any_expands_to_all_methods() {
        let routes = import(json!({
            "catalog": { "path": "/catalog", "method": "ANY" }
        }));

        let route = routes.get_by_name("catalog").unwrap();
        let methods: Vec<_> = route.methods().keys().copied().collect();
        assert_eq!(
            methods,
            vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete]
        );
    }

    #[test]
    fn test_pipe_separated_methods() {
        let routes = import(json!({
            "login": { "path": "/login", "method": "GET|POST|HEAD" }
        }));

        let route = routes.get_by_name("login").unwrap();
        assert_eq!(route.methods().len(), 2);
        assert!(route.method(HttpMethod::Get).is_some());
        assert!(route.method(HttpMethod::Post).is_some());
    }

    #[test]
    fn test_escaped_slashes_are_normalized() {
        let routes = import(json!({
            "about": { "path": "\\/pages\\/about", "method": "GET" }
        }));
        assert_eq!(routes.get_by_name("about").unwrap().url, "/pages/about");
    }

    #[test]
    fn test_requirement_type_inference() {
        let routes = import(json!({
            "post_show": {
                "path": "/posts/{page}/{slug}",
                "method": "GET",
                "requirements": { "page": "\\\\d+", "slug": "[a-z-]+", "_format": "html|xml" }
            }
        }));

        let method = routes.get_by_name("post_show").unwrap().method(HttpMethod::Get).unwrap();
        let page = method.parameter("page").unwrap();
        assert_eq!(page.param_type, "integer");
        assert_eq!(page.location, ParameterLocation::Path);
        assert!(page.required);

        let slug = method.parameter("slug").unwrap();
        assert_eq!(slug.param_type, "string");

        let format = method.parameter("_format").unwrap();
        assert_eq!(format.location, ParameterLocation::Form);
        assert!(format.required);
    }

    #[test]
    fn test_requirement_type() {
        assert_eq!(requirement_type(r"\\d+"), "integer");
        assert_eq!(requirement_type(r"\\D+"), "integer");
        assert_eq!(requirement_type(r"\d+"), "string");
        assert_eq!(requirement_type(r"[0-9]+"), "string");
        assert_eq!(requirement_type(r"\\d+\.\\d+"), "string");
    }

    #[test]
    fn test_single_backslash_digit_requirement_is_string() {
        let routes = import(json!({
            "page": {
                "path": "/p/{n}",
                "method": "GET",
                "requirements": { "n": "\\d+" }
            }
        }));

        let method = routes.get_by_name("page").unwrap().method(HttpMethod::Get).unwrap();
        let n = method.parameter("n").unwrap();
        assert_eq!(n.location, ParameterLocation::Path);
        assert_eq!(n.param_type, "string");
    }

    #[test]
    fn test_placeholders_without_requirements() {
        let routes = import(json!({
            "user_post": { "path": "/users/{id}/posts/{slug}", "method": "GET" }
        }));

        let method = routes.get_by_name("user_post").unwrap().method(HttpMethod::Get).unwrap();
        assert_eq!(method.parameters().len(), 2);

        let id = method.parameter("id").unwrap();
        assert_eq!(id.location, ParameterLocation::Path);
        assert_eq!(id.param_type, "integer");
        assert!(id.required);

        let slug = method.parameter("slug").unwrap();
        assert_eq!(slug.location, ParameterLocation::Path);
        assert_eq!(slug.param_type, "string");
    }

    #[test]
    fn test_defaults_become_optional_form_parameters() {
        let routes = import(json!({
            "list": {
                "path": "/list",
                "method": "GET",
                "defaults": { "page": "1", "limit": 20, "filter": null }
            }
        }));

        let method = routes.get_by_name("list").unwrap().method(HttpMethod::Get).unwrap();
        assert_eq!(method.default_value("page"), Some("1"));
        assert_eq!(method.default_value("limit"), Some("20"));

        let page = method.parameter("page").unwrap();
        assert_eq!(page.location, ParameterLocation::Form);
        assert!(!page.required);
        assert_eq!(page.default, "1");
        assert!(!method.parameter("filter").unwrap().has_default());
    }

    #[test]
    fn test_missing_or_placeholder_sub_objects_are_tolerated() {
        let routes = import(json!({
            "home": { "path": "/", "method": "GET", "defaults": [], "requirements": "NO CUSTOM" }
        }));

        let method = routes.get_by_name("home").unwrap().method(HttpMethod::Get).unwrap();
        assert!(method.parameters().is_empty());
        assert!(method.default_values().is_empty());
    }

    #[test]
    fn test_existing_route_is_updated_by_name() {
        let mut routes = RouteSet::new();
        routes.insert_by_url(Route::new("/users/{id}", "user_show"));

        SymfonyJsonImporter.import(
            json!({
                "user_show": { "path": "/users/{id}", "method": "PUT" },
                "user_list": { "path": "/users", "method": "GET" }
            })
            .as_object()
            .unwrap(),
            &mut routes,
        );
        SymfonyJsonImporter.import(
            json!({ "user_show": { "path": "/users/{id}", "method": "PUT" } })
                .as_object()
                .unwrap(),
            &mut routes,
        );

        assert_eq!(routes.len(), 2);
        let route = routes.get_by_name("user_show").unwrap();
        assert_eq!(route.methods().len(), 1);
        assert_eq!(
            route.method(HttpMethod::Put).unwrap().parameters().len(),
            1
        );
    }

    #[test]
    fn test_import_file_missing_leaves_routes_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let mut routes = RouteSet::new();
        routes.insert_by_url(Route::new("/kept", "kept"));

        SymfonyJsonImporter
            .import_file(&temp_dir.path().join("missing.json"), &mut routes)
            .unwrap();

        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn test_import_file_rejects_non_object() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("routes.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = SymfonyJsonImporter
            .import_file(&path, &mut RouteSet::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidJson { .. }));
    }

    #[test]
    fn test_import_preserves_document_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("routes.json");
        fs::write(
            &path,
            r#"{"zeta": {"path": "/z", "method": "GET"}, "alpha": {"path": "/a", "method": "GET"}}"#,
        )
        .unwrap();

        let mut routes = RouteSet::new();
        SymfonyJsonImporter.import_file(&path, &mut routes).unwrap();

        let names: Vec<_> = routes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
