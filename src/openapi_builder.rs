use crate::extractor::{
    has_placeholder, HttpMethod, Parameter, ParameterLocation, Route, DEFAULT_PRODUCES,
};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// OpenAPI 2.0 (Swagger) document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Server host, e.g. `localhost:8080`
    host: String,
    /// Base path all URLs are relative to
    base_path: String,
    /// Paths collection (URL -> PathItem), in order of first appearance
    paths: IndexMap<String, PathItem>,
    /// Name of the route that produced each (URL, verb) operation
    operation_owners: HashMap<(String, HttpMethod), String>,
    /// One diagnostic per operation replaced by a later route
    collisions: Vec<String>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// API version
    pub version: String,
}

/// OpenAPI PathItem object - all operations for a single URL plus the shared path parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// Path parameters shared by every operation of this URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterObject>>,
}

impl PathItem {
    /// Operation slot for `method`
    pub fn operation_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
        }
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
        }
    }

    /// `(verb, operation)` pairs that are present
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|op| (method, op)))
    }
}

/// OpenAPI Operation object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub summary: String,
    pub description: String,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    pub produces: Vec<String>,
    /// Body, query, form and header parameters (path parameters live on the path item)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterObject>>,
    pub responses: IndexMap<String, Response>,
}

/// OpenAPI 2.0 Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterObject {
    pub name: String,
    /// Parameter location (query, path, header, formData)
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Present only when the parameter has a default literal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl From<&Parameter> for ParameterObject {
    fn from(param: &Parameter) -> Self {
        Self {
            name: param.name.clone(),
            location: param.location.openapi_in().to_string(),
            required: param.required,
            param_type: param.param_type.clone(),
            description: param.name.clone(),
            operation_id: param.name.clone(),
            default: param.has_default().then(|| param.default.clone()),
        }
    }
}

/// OpenAPI Response object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
}

/// Complete OpenAPI 2.0 document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// Specification version, always `2.0`
    pub swagger: String,
    pub host: String,
    #[serde(rename = "basePath")]
    pub base_path: String,
    pub produces: Vec<String>,
    pub info: Info,
    pub paths: IndexMap<String, PathItem>,
}

/// Default title and description of generated documents
const GENERATED_TITLE: &str = "auto-generated swagger specification";

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info, host and base path
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: GENERATED_TITLE.to_string(),
                description: Some(GENERATED_TITLE.to_string()),
                version: "1.0.0".to_string(),
            },
            host: "localhost:8080".to_string(),
            base_path: "/".to_string(),
            paths: IndexMap::new(),
            operation_owners: HashMap::new(),
            collisions: Vec::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            description,
            version,
        };
        self
    }

    /// Set the host and base path written at the top of the document
    pub fn with_server(mut self, host: impl Into<String>, base_path: impl Into<String>) -> Self {
        self.host = host.into();
        self.base_path = base_path.into();
        self
    }

    /// Add every method of a route to the document.
    ///
    /// Routes sharing a URL end up in the same path item. When two routes declare the
    /// same verb on one URL the route added last wins and a warning is logged.
    pub fn add_route(&mut self, route: &Route) {
        debug!("Adding route: {} ({})", route.url, route.name);

        let path_item = self.paths.entry(route.url.clone()).or_default();

        for (method, route_method) in route.methods() {
            let operation_parameters: Vec<ParameterObject> = route_method
                .parameters()
                .iter()
                .filter(|p| p.location != ParameterLocation::Path)
                .map(ParameterObject::from)
                .collect();

            let mut responses = IndexMap::new();
            responses.insert(
                "200".to_string(),
                Response {
                    description: "Success".to_string(),
                },
            );

            let operation = Operation {
                summary: route.name.clone(),
                description: route.name.clone(),
                operation_id: route.name.clone(),
                produces: vec![route_method.produces.clone()],
                parameters: (!operation_parameters.is_empty()).then_some(operation_parameters),
                responses,
            };

            let owner_key = (route.url.clone(), *method);
            if let Some(previous) = self.operation_owners.get(&owner_key) {
                let message = format!(
                    "{} {} is declared by both '{}' and '{}', keeping '{}'",
                    method.as_str(),
                    route.url,
                    previous,
                    route.name,
                    route.name
                );
                warn!("{}", message);
                self.collisions.push(message);
            }
            self.operation_owners.insert(owner_key, route.name.clone());

            *path_item.operation_mut(*method) = Some(operation);
        }

        // Path parameters come from the first route/method seen for this URL
        if path_item.parameters.is_none() && has_placeholder(&route.url) {
            if let Some(first_method) = route.first_method() {
                path_item.parameters = Some(
                    first_method
                        .parameters()
                        .iter()
                        .filter(|p| p.location == ParameterLocation::Path)
                        .map(ParameterObject::from)
                        .collect(),
                );
            }
        }
    }

    /// Diagnostics for (URL, verb) pairs declared by more than one route, in the
    /// order they were hit. Each one has already been logged at `warn`.
    pub fn collisions(&self) -> &[String] {
        &self.collisions
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!("Building final OpenAPI document with {} paths", self.paths.len());

        OpenApiDocument {
            swagger: "2.0".to_string(),
            host: self.host,
            base_path: self.base_path,
            produces: vec![DEFAULT_PRODUCES.to_string()],
            info: self.info,
            paths: self.paths,
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the OpenAPI 2.0 document for `routes`.
pub fn build_document(routes: &[Route], host: &str, base_path: &str) -> OpenApiDocument {
    let mut builder = OpenApiBuilder::new().with_server(host, base_path);
    for route in routes {
        builder.add_route(route);
    }
    builder.build()
}
