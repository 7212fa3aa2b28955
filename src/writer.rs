//! Output writers turning the final route list into files.
//!
//! Every writer receives the same routes, host and base path. Writers pick their own
//! file extension and default file name:
//!
//! | writer | default file |
//! |---|---|
//! | [`OpenApi20Writer`] | `result.json` |
//! | [`OpenApiYamlWriter`] | `result.yaml` |
//! | [`CsvWriter`] | `routes.csv` |
//! | [`TextListWriter`] | `routes.txt` |

use crate::extractor::Route;
use crate::openapi_builder::build_document;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::validation::validate_document;
use anyhow::Result;
use log::{info, warn};
use std::path::Path;

/// Trait for writers producing one output file from the route list.
pub trait OutputWriter {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Preferred extension, including the leading dot
    fn file_extension(&self) -> &'static str;

    /// File name used when the caller gives none
    fn preferred_file_name(&self) -> &'static str;

    /// Writes the routes to `path`, replacing any existing file.
    fn write(&self, routes: &[Route], host: &str, base_path: &str, path: &Path) -> Result<()>;
}

/// OpenAPI 2.0 document as JSON, checked by [`validate_document`] after writing
pub struct OpenApi20Writer;

/// The same OpenAPI 2.0 document as YAML
pub struct OpenApiYamlWriter;

/// `Route;Method;Name;Produces` listing
pub struct CsvWriter;

/// Plain list of URLs, one per line
pub struct TextListWriter;

impl OutputWriter for OpenApi20Writer {
    fn name(&self) -> &'static str {
        "openapi"
    }

    fn file_extension(&self) -> &'static str {
        ".json"
    }

    fn preferred_file_name(&self) -> &'static str {
        "result.json"
    }

    fn write(&self, routes: &[Route], host: &str, base_path: &str, path: &Path) -> Result<()> {
        let document = build_document(routes, host, base_path);
        let content = serialize_json(&document)?;

        info!("Write swagger specification: {}", path.display());
        write_to_file(&content, path)?;

        info!("Validate swagger file...");
        report_findings(&validate_document(&document));
        Ok(())
    }
}

impl OutputWriter for OpenApiYamlWriter {
    fn name(&self) -> &'static str {
        "openapi-yaml"
    }

    fn file_extension(&self) -> &'static str {
        ".yaml"
    }

    fn preferred_file_name(&self) -> &'static str {
        "result.yaml"
    }

    fn write(&self, routes: &[Route], host: &str, base_path: &str, path: &Path) -> Result<()> {
        let document = build_document(routes, host, base_path);
        let content = serialize_yaml(&document)?;

        info!("Write swagger specification: {}", path.display());
        write_to_file(&content, path)?;
        report_findings(&validate_document(&document));
        Ok(())
    }
}

impl OutputWriter for CsvWriter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn file_extension(&self) -> &'static str {
        ".csv"
    }

    fn preferred_file_name(&self) -> &'static str {
        "routes.csv"
    }

    fn write(&self, routes: &[Route], _host: &str, _base_path: &str, path: &Path) -> Result<()> {
        write_to_file(&render_csv(routes), path)
    }
}

impl OutputWriter for TextListWriter {
    fn name(&self) -> &'static str {
        "text"
    }

    fn file_extension(&self) -> &'static str {
        ".txt"
    }

    fn preferred_file_name(&self) -> &'static str {
        "routes.txt"
    }

    fn write(&self, routes: &[Route], _host: &str, _base_path: &str, path: &Path) -> Result<()> {
        write_to_file(&render_text_list(routes), path)
    }
}

/// Output file name for `writer`.
///
/// A caller-supplied name is used as is for a single writer; with several writers its
/// stem is kept and the writer's own extension applied.
pub fn output_file_name(writer: &dyn OutputWriter, file_name: Option<&str>, several: bool) -> String {
    match file_name {
        None => writer.preferred_file_name().to_string(),
        Some(name) if !several => name.to_string(),
        Some(name) => {
            let stem = Path::new(name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.to_string());
            format!("{}{}", stem, writer.file_extension())
        }
    }
}

/// One line per route, described by its first method.
pub fn render_csv(routes: &[Route]) -> String {
    let mut out = String::from("Route;Method;Name;Produces\n");
    for route in routes {
        let (method, produces) = route
            .first_method()
            .map(|m| (m.method.as_str(), m.produces.as_str()))
            .unwrap_or(("", ""));
        out.push_str(&format!("{};{};{};{}\n", route.url, method, route.name, produces));
    }
    out
}

pub fn render_text_list(routes: &[Route]) -> String {
    routes.iter().map(|r| format!("{}\n", r.url)).collect()
}

fn report_findings(findings: &[String]) {
    if findings.is_empty() {
        info!("Swagger validation succeeded");
        return;
    }

    warn!("Validation warnings occurred:");
    for finding in findings {
        warn!("  {}", finding);
    }
}
