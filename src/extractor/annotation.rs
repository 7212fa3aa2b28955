use crate::error::{Error, Result};
use crate::extractor::{
    ExtractionConfig, HttpMethod, Parameter, ParameterLocation, Route, RouteExtractor,
};
use crate::pipeline::RouteSet;
use crate::scanner::FileScanner;
use indexmap::IndexMap;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Annotation token that marks a route declaration
pub const MARKER: &str = "@Route";

static MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@Route\s*\(").expect("marker pattern is valid"));

static KEY_ASSIGNMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""\s*="#).expect("assignment pattern is valid"));

static REPEATED_SLASH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/{2,}").expect("slash pattern is valid"));

/// Extracts routes from `@Route(...)` annotations in source files.
///
/// The first annotation of a file declares the base URL (usually the controller-level
/// `@Route("/prefix")`); every later annotation with a `name` becomes a route whose URL
/// is the base URL followed by its own relative URL.
pub struct AnnotationExtractor;

/// Arguments of one `@Route(...)` occurrence after splitting.
#[derive(Debug, Default)]
struct Occurrence {
    url: String,
    name: String,
    attributes: IndexMap<String, String>,
}

/// Per-file state carried from one occurrence to the next.
#[derive(Debug, Default)]
struct ScanState {
    base_url: Option<String>,
}

impl AnnotationExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Reads `path` and extracts its routes.
    ///
    /// Unreadable files are logged and contribute no routes.
    pub fn extract_file(&self, path: &Path) -> Vec<Route> {
        debug!("Scanning file: {}", path.display());

        match fs::read_to_string(path) {
            Ok(content) => self.extract_from_str(&content),
            Err(e) => {
                warn!("Failed to read file {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Extracts routes from the text of one file, in order of appearance.
    pub fn extract_from_str(&self, content: &str) -> Vec<Route> {
        if !content.contains(MARKER) {
            return Vec::new();
        }

        let mut state = ScanState::default();
        let mut routes = Vec::new();

        for args in find_occurrences(content) {
            let occurrence = split_arguments(&unfold_docblock(args));
            match Self::process_occurrence(&mut state, occurrence) {
                Ok(Some(route)) => routes.push(route),
                Ok(None) => {}
                Err(e) => warn!("Skipping @Route annotation ({}): {}", e, args.trim()),
            }
        }

        routes
    }

    fn process_occurrence(state: &mut ScanState, occurrence: Occurrence) -> Result<Option<Route>> {
        let base_url = state
            .base_url
            .get_or_insert_with(|| occurrence.url.clone())
            .clone();

        if occurrence.name.is_empty() || occurrence.url == base_url {
            debug!(
                "Skipping base declaration: url '{}', name '{}'",
                occurrence.url, occurrence.name
            );
            return Ok(None);
        }

        let url = compose_url(&base_url, &occurrence.url);
        let mut route = Route::new(url, occurrence.name);
        let method = route.method_mut(HttpMethod::Get);

        if let Some(defaults) = occurrence.attributes.get("defaults") {
            for (key, value) in parse_defaults(defaults)? {
                method.add_default_value(key, value);
            }
        }

        let mut required = HashSet::new();
        if let Some(requirements) = occurrence.attributes.get("requirements") {
            for key in parse_requirements(requirements)? {
                let default = method.default_value(&key).unwrap_or_default().to_string();
                method.add_parameter(Parameter::new(
                    key.clone(),
                    ParameterLocation::Path,
                    true,
                    "string",
                    default,
                ));
                required.insert(key);
            }
        }

        let optional: Vec<(String, String)> = method
            .default_values()
            .iter()
            .filter(|(key, _)| !required.contains(*key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        for (key, value) in optional {
            method.add_parameter(Parameter::new(
                key,
                ParameterLocation::Path,
                false,
                "string",
                value,
            ));
        }

        debug!("Found route: {} ({})", route.url, route.name);
        Ok(Some(route))
    }
}

impl Default for AnnotationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteExtractor for AnnotationExtractor {
    fn name(&self) -> &'static str {
        "annotations"
    }

    fn is_active(&self, config: &ExtractionConfig) -> bool {
        config.source_dir.is_some()
    }

    fn extract(&self, config: &ExtractionConfig, routes: &mut RouteSet) -> anyhow::Result<()> {
        let Some(source_dir) = &config.source_dir else {
            return Ok(());
        };

        let scanner = FileScanner::new(source_dir.clone()).with_extension(&config.extension);
        let scan_result = scanner.scan()?;
        info!(
            "Found {} .{} files in {}",
            scan_result.files.len(),
            config.extension,
            source_dir.display()
        );

        for file in &scan_result.files {
            for route in self.extract_file(file) {
                routes.insert_by_url(route);
            }
        }

        Ok(())
    }
}

/// Finds every `@Route(...)` occurrence and returns the text between its parentheses.
///
/// Parentheses are balanced (ignoring those inside double quotes). An occurrence that
/// is still open when the next marker starts, or at the end of the text, is dropped.
fn find_occurrences(content: &str) -> Vec<&str> {
    let mut occurrences = Vec::new();
    let mut pos = 0;

    while let Some(m) = MARKER_REGEX.find_at(content, pos) {
        let start = m.end();
        match find_closing_paren(content, start) {
            Some(end) => {
                occurrences.push(&content[start..end]);
                pos = end + 1;
            }
            None => {
                warn!("Unterminated {} annotation at byte {}", MARKER, m.start());
                pos = start;
            }
        }
    }

    occurrences
}

fn find_closing_paren(content: &str, start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_quotes = false;

    for (offset, c) in content[start..].char_indices() {
        let idx = start + offset;
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            '@' if !in_quotes && content[idx..].starts_with(MARKER) => return None,
            _ => {}
        }
    }

    None
}

/// Joins docblock continuation lines (` * ...`) into a single line.
fn unfold_docblock(args: &str) -> String {
    args.lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits an argument list on `", "` outside of braces and sorts the fields into
/// url, name and auxiliary attributes.
fn split_arguments(args: &str) -> Occurrence {
    let mut occurrence = Occurrence::default();

    for field in split_top_level(args) {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }

        match field.split_once('=') {
            None => occurrence.url = strip_quotes(field),
            Some((key, value)) => {
                let key = strip_quotes(key);
                let value = value.trim();
                match key.as_str() {
                    "name" => occurrence.name = strip_quotes(value),
                    "path" | "value" => occurrence.url = strip_quotes(value),
                    _ => {
                        occurrence.attributes.insert(key, value.to_string());
                    }
                }
            }
        }
    }

    occurrence
}

fn split_top_level(args: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut depth = 0i32;
    let mut field_start = 0;
    let bytes = args.as_bytes();

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            b',' if depth <= 0 && bytes.get(i + 1) == Some(&b' ') => {
                fields.push(&args[field_start..i]);
                field_start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    fields.push(&args[field_start..]);

    fields
}

fn strip_quotes(value: &str) -> String {
    value.replace(['"', '\''], "").trim().to_string()
}

/// Base URL + relative URL, without doubled separators.
///
/// A relative URL that already starts with `base/` is taken as a full path and kept
/// as is, so `/catalogs` + `/catalogs/semester/{locale}` stays
/// `/catalogs/semester/{locale}`. The same holds for `/api` + `/api/v1`, which stays
/// `/api/v1`; a nested prefix repeating the base cannot be declared this way.
fn compose_url(base_url: &str, relative_url: &str) -> String {
    let base_prefix = base_url.trim_end_matches('/');
    let url = if !base_prefix.is_empty() && relative_url.starts_with(&format!("{}/", base_prefix))
    {
        relative_url.to_string()
    } else if base_url.ends_with('/') && relative_url.starts_with('/') {
        format!("{}{}", base_url, &relative_url[1..])
    } else {
        format!("{}{}", base_url, relative_url)
    };

    REPEATED_SLASH_REGEX.replace_all(&url, "/").into_owned()
}

/// Parses `{"key"=value, ...}` into ordered key/value pairs.
fn parse_defaults(value: &str) -> Result<Vec<(String, String)>> {
    let malformed = |message: &str| Error::MalformedMetadata {
        attribute: "defaults".to_string(),
        message: format!("{}: {}", message, value),
    };

    let trimmed = value.replace('*', "");
    let inner = trimmed
        .trim()
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| malformed("expected a {...} block"))?;

    let mut pairs = Vec::new();
    for pair in inner.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (key, val) = pair
            .split_once('=')
            .or_else(|| pair.split_once(':'))
            .ok_or_else(|| malformed("expected key=value"))?;
        pairs.push((strip_quotes(key), strip_quotes(val)));
    }

    Ok(pairs)
}

/// Normalizes `{"key"="regex", ...}` into JSON and returns its keys in order.
fn parse_requirements(value: &str) -> Result<Vec<String>> {
    let normalized = value.replace('*', "");
    let normalized = KEY_ASSIGNMENT_REGEX.replace_all(&normalized, "\":");
    let normalized = normalized.replace('\\', "\\\\");

    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(normalized.trim())
        .map_err(|e| Error::MalformedMetadata {
            attribute: "requirements".to_string(),
            message: e.to_string(),
        })?;

    Ok(object.keys().cloned().collect())
}
