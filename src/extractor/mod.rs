//! Route extraction module and the shared route model.
//!
//! Routes come from two kinds of sources, each handled by its own extractor:
//!
//! - **Annotations**: `@Route(...)` markers in PHP docblocks, see [`annotation::AnnotationExtractor`]
//! - **Route dumps**: the JSON printed by `debug:router --format=json`, see
//!   [`symfony_json::SymfonyJsonImporter`]
//!
//! Both extractors feed the same [`crate::pipeline::RouteSet`], which is driven by
//! [`crate::pipeline::ExtractionPipeline`].
//!
//! # Example
//!
//! ```no_run
//! use route_extractor::extractor::annotation::AnnotationExtractor;
//!
//! let source = r#"
//!     /** @Route("/catalogs") */
//!     /** @Route("/semester/{locale}", name="catalog_semester") */
//! "#;
//! let routes = AnnotationExtractor::new().extract_from_str(source);
//! assert_eq!(routes[0].url, "/catalogs/semester/{locale}");
//! ```

pub mod annotation;
pub mod symfony_json;

use crate::pipeline::RouteSet;
use anyhow::Result;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

/// Content type attached to every new [`RouteMethod`].
pub const DEFAULT_PRODUCES: &str = "application/xml";

static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}/]+)\}").expect("placeholder pattern is valid"));

/// Names of all `{name}` placeholders in `url`, in order of appearance.
///
/// # Example
///
/// ```
/// use route_extractor::extractor::placeholders;
///
/// assert_eq!(placeholders("/users/{id}/posts/{slug}"), vec!["id", "slug"]);
/// ```
pub fn placeholders(url: &str) -> Vec<&str> {
    PLACEHOLDER_REGEX
        .captures_iter(url)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Whether `url` contains at least one `{name}` placeholder
pub fn has_placeholder(url: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(url)
}

/// Inputs that decide which extractors run and what they read.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Directory scanned recursively for annotated source files
    pub source_dir: Option<PathBuf>,
    /// Route dump produced by `debug:router --format=json`
    pub symfony_json: Option<PathBuf>,
    /// Extension (without the dot) of the files fed to the annotation extractor
    pub extension: String,
}

impl ExtractionConfig {
    /// Configuration with no inputs that scans `.php` files
    pub fn new() -> Self {
        Self {
            source_dir: None,
            symfony_json: None,
            extension: "php".to_string(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for one stage of the extraction pipeline.
///
/// Implementations decide from the configuration whether they have any input to
/// work on, and then add to (or update) the shared route set.
pub trait RouteExtractor {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Whether the configuration supplies this extractor's input.
    fn is_active(&self, config: &ExtractionConfig) -> bool;

    /// Extracts routes and merges them into `routes` according to the
    /// extractor's own identity rule.
    fn extract(&self, config: &ExtractionConfig, routes: &mut RouteSet) -> Result<()>;
}

/// HTTP methods a route can be exposed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Every verb, in the order `ANY` expands to.
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
    ];

    /// Upper-case token, as written in route dumps and CSV output
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Lower-case token used as the key of an OpenAPI path item
    pub fn openapi_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
        }
    }

    /// Parses an upper-case token. Matching is case-insensitive.
    pub fn parse(token: &str) -> Option<HttpMethod> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(token.trim()))
    }
}

/// The location where a parameter value is carried in an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    /// Query string parameter (e.g., `?page=1`)
    Query,
    /// Path parameter embedded in the URL (e.g., `/users/{id}`)
    Path,
    /// HTTP header parameter
    Header,
    /// Form field in the request body
    Form,
}

impl ParameterLocation {
    /// Value of the OpenAPI 2.0 `in` field
    pub fn openapi_in(&self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Path => "path",
            ParameterLocation::Header => "header",
            ParameterLocation::Form => "formData",
        }
    }
}

/// A single request parameter of a [`RouteMethod`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name, as it appears in the URL placeholder or form field
    pub name: String,
    /// Where the value is carried in the request
    pub location: ParameterLocation,
    /// Whether the parameter must be supplied
    pub required: bool,
    /// Declared type, `"string"` or `"integer"` for everything the extractors produce
    pub param_type: String,
    /// Default literal; empty means no default
    pub default: String,
}

impl Parameter {
    /// Creates a new parameter.
    ///
    /// # Arguments
    ///
    /// * `name` - Parameter name
    /// * `location` - Where the value is carried in the request
    /// * `required` - Whether the parameter must be supplied
    /// * `param_type` - Declared type, usually `"string"` or `"integer"`
    /// * `default` - Default literal, empty for none
    ///
    /// # Example
    ///
    /// ```
    /// use route_extractor::extractor::{Parameter, ParameterLocation};
    ///
    /// let page = Parameter::new("page", ParameterLocation::Path, false, "string", "1");
    /// assert!(page.has_default());
    /// ```
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        required: bool,
        param_type: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            required,
            param_type: param_type.into(),
            default: default.into(),
        }
    }

    /// Whether a non-empty default literal is set
    pub fn has_default(&self) -> bool {
        !self.default.is_empty()
    }
}

/// Parameter, content type and default-value profile for one HTTP verb of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMethod {
    /// HTTP verb this profile belongs to
    pub method: HttpMethod,
    /// Response content type, [`DEFAULT_PRODUCES`] unless changed
    pub produces: String,
    parameters: Vec<Parameter>,
    default_values: IndexMap<String, String>,
}

impl RouteMethod {
    /// Creates an empty method profile producing [`DEFAULT_PRODUCES`].
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP verb
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            produces: DEFAULT_PRODUCES.to_string(),
            parameters: Vec::new(),
            default_values: IndexMap::new(),
        }
    }

    /// Declared parameters, in the order they were first added
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Adds a parameter. A parameter with the same name is overwritten in place,
    /// keeping its position in the list.
    pub fn add_parameter(&mut self, parameter: Parameter) {
        match self.parameters.iter_mut().find(|p| p.name == parameter.name) {
            Some(existing) => *existing = parameter,
            None => self.parameters.push(parameter),
        }
    }

    /// Whether a parameter named `name` is declared
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }

    /// Looks up a declared parameter by name.
    ///
    /// # Returns
    ///
    /// The parameter, or `None` if no parameter named `name` was added.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Default values by parameter name, in insertion order
    pub fn default_values(&self) -> &IndexMap<String, String> {
        &self.default_values
    }

    /// Records a default value, replacing an earlier one for the same name.
    ///
    /// Only the default map changes. Declaring the matching parameter is up to the caller.
    pub fn add_default_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.default_values.insert(name.into(), value.into());
    }

    /// Default value recorded for `name`, if any
    pub fn default_value(&self, name: &str) -> Option<&str> {
        self.default_values.get(name).map(String::as_str)
    }
}

/// A URL + name endpoint with one [`RouteMethod`] per HTTP verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Full, normalized URL
    pub url: String,
    /// Route name, the identity used by the route dump importer
    pub name: String,
    methods: IndexMap<HttpMethod, RouteMethod>,
}

impl Route {
    /// Creates a route without any methods.
    ///
    /// # Arguments
    ///
    /// * `url` - Full URL, e.g. `/catalogs/semester/{locale}`
    /// * `name` - Route name, e.g. `catalog_semester`
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            methods: IndexMap::new(),
        }
    }

    /// Attaches a method, replacing any existing one for the same verb.
    pub fn add_method(&mut self, route_method: RouteMethod) {
        self.methods.insert(route_method.method, route_method);
    }

    /// Returns the method for `method`, creating an empty one if absent.
    pub fn method_mut(&mut self, method: HttpMethod) -> &mut RouteMethod {
        self.methods
            .entry(method)
            .or_insert_with(|| RouteMethod::new(method))
    }

    /// The profile for `method`, if the route is exposed under that verb
    pub fn method(&self, method: HttpMethod) -> Option<&RouteMethod> {
        self.methods.get(&method)
    }

    /// All method profiles, in the order they were attached
    pub fn methods(&self) -> &IndexMap<HttpMethod, RouteMethod> {
        &self.methods
    }

    /// The method that was attached first, if any
    pub fn first_method(&self) -> Option<&RouteMethod> {
        self.methods.values().next()
    }
}
