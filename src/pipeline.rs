//! Merge policy: runs the extractors in a fixed order over one shared route set.

use crate::extractor::annotation::AnnotationExtractor;
use crate::extractor::symfony_json::SymfonyJsonImporter;
use crate::extractor::{ExtractionConfig, Route, RouteExtractor};
use anyhow::Result;
use log::{debug, info};
use std::collections::{HashMap, HashSet};

/// Ordered, append-only collection of routes.
///
/// Routes can be inserted under two identity rules: by URL (annotation scanner) or
/// by name (route dump importer). A name index is kept for every route so that the
/// importer can update routes in place no matter who inserted them.
#[derive(Debug, Default)]
pub struct RouteSet {
    routes: Vec<Route>,
    urls: HashSet<String>,
    names: HashMap<String, usize>,
}

impl RouteSet {
    /// Creates an empty route set
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `route` unless a route with the same URL is already present.
    ///
    /// Returns `false` when the route was dropped.
    pub fn insert_by_url(&mut self, route: Route) -> bool {
        if self.urls.contains(&route.url) {
            debug!("Dropping duplicate route for URL: {}", route.url);
            return false;
        }
        self.push(route);
        true
    }

    /// Returns the route named `name`, appending a new `Route(url, name)` first
    /// if no route has that name yet.
    pub fn find_or_insert_by_name(&mut self, url: &str, name: &str) -> &mut Route {
        let existing = self.names.get(name).copied();
        let idx = match existing {
            Some(idx) => idx,
            None => {
                info!("Add new route: {}, url: {}", name, url);
                self.push(Route::new(url, name))
            }
        };
        &mut self.routes[idx]
    }

    /// The first route inserted under `name`
    pub fn get_by_name(&self, name: &str) -> Option<&Route> {
        self.names.get(name).map(|&idx| &self.routes[idx])
    }

    /// Routes in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn as_slice(&self) -> &[Route] {
        &self.routes
    }

    /// Consumes the set, returning the ordered routes
    pub fn into_vec(self) -> Vec<Route> {
        self.routes
    }

    fn push(&mut self, route: Route) -> usize {
        let idx = self.routes.len();
        self.urls.insert(route.url.clone());
        self.names.entry(route.name.clone()).or_insert(idx);
        self.routes.push(route);
        idx
    }
}

impl<'a> IntoIterator for &'a RouteSet {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

/// Drives the configured extractors, annotation scanner first, route dump second.
pub struct ExtractionPipeline {
    extractors: Vec<Box<dyn RouteExtractor>>,
}

impl ExtractionPipeline {
    /// Pipeline with the built-in extractors in their fixed order
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(AnnotationExtractor::new()),
                Box::new(SymfonyJsonImporter),
            ],
        }
    }

    /// Pipeline over a caller-supplied, already ordered list of extractors
    pub fn with_extractors(extractors: Vec<Box<dyn RouteExtractor>>) -> Self {
        Self { extractors }
    }

    /// Runs every active extractor in order and returns the merged routes.
    pub fn run(&self, config: &ExtractionConfig) -> Result<RouteSet> {
        let mut routes = RouteSet::new();

        for extractor in &self.extractors {
            if !extractor.is_active(config) {
                debug!("Skipping inactive extractor: {}", extractor.name());
                continue;
            }

            let before = routes.len();
            info!("Running extractor: {}", extractor.name());
            extractor.extract(config, &mut routes)?;
            info!(
                "Extractor {} finished, {} new routes ({} total)",
                extractor.name(),
                routes.len() - before,
                routes.len()
            );
        }

        Ok(routes)
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::HttpMethod;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_insert_by_url_drops_duplicates() {
        let mut set = RouteSet::new();
        assert!(set.insert_by_url(Route::new("/a", "first")));
        assert!(!set.insert_by_url(Route::new("/a", "second")));
        assert!(set.insert_by_url(Route::new("/b", "third")));

        let names: Vec<_> = set.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "third"]);
    }

    #[test]
    fn test_find_or_insert_by_name_mutates_in_place() {
        let mut set = RouteSet::new();
        set.insert_by_url(Route::new("/scanned", "shared"));

        set.find_or_insert_by_name("/ignored", "shared")
            .method_mut(HttpMethod::Post);
        set.find_or_insert_by_name("/new", "fresh");

        assert_eq!(set.len(), 2);
        let shared = set.get_by_name("shared").unwrap();
        assert_eq!(shared.url, "/scanned");
        assert!(shared.method(HttpMethod::Post).is_some());
        assert_eq!(set.as_slice()[1].url, "/new");
    }

    struct FixedExtractor {
        name: &'static str,
        active: bool,
        urls: Vec<&'static str>,
    }

    impl RouteExtractor for FixedExtractor {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_active(&self, _config: &ExtractionConfig) -> bool {
            self.active
        }

        fn extract(&self, _config: &ExtractionConfig, routes: &mut RouteSet) -> Result<()> {
            for url in &self.urls {
                routes.insert_by_url(Route::new(*url, self.name));
            }
            Ok(())
        }
    }

    #[test]
    fn test_pipeline_runs_active_extractors_in_order() {
        let pipeline = ExtractionPipeline::with_extractors(vec![
            Box::new(FixedExtractor { name: "one", active: true, urls: vec!["/a", "/b"] }),
            Box::new(FixedExtractor { name: "off", active: false, urls: vec!["/z"] }),
            Box::new(FixedExtractor { name: "two", active: true, urls: vec!["/b", "/c"] }),
        ]);

        let routes = pipeline.run(&ExtractionConfig::new()).unwrap();
        let pairs: Vec<_> = routes
            .iter()
            .map(|r| (r.url.as_str(), r.name.as_str()))
            .collect();
        assert_eq!(pairs, vec![("/a", "one"), ("/b", "one"), ("/c", "two")]);
    }

    #[test]
    fn test_pipeline_without_inputs_is_empty() {
        let routes = ExtractionPipeline::new().run(&ExtractionConfig::new()).unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn test_pipeline_json_updates_scanned_route() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(
            src.join("UserController.php"),
            r#"<?php
            /** @Route("/users") */
            class UserController {
                /** @Route("/{id}", name="user_show") */
                public function show($id) {}
            }
            "#,
        )
        .unwrap();
        let json = temp_dir.path().join("routes.json");
        fs::write(
            &json,
            r#"{"user_show": {"path": "/users/{id}", "method": "POST"}}"#,
        )
        .unwrap();

        let config = ExtractionConfig {
            source_dir: Some(src),
            symfony_json: Some(json),
            extension: "php".to_string(),
        };
        let routes = ExtractionPipeline::new().run(&config).unwrap();

        assert_eq!(routes.len(), 1);
        let route = routes.get_by_name("user_show").unwrap();
        assert_eq!(route.url, "/users/{id}");
        assert!(route.method(HttpMethod::Get).is_some());
        assert!(route.method(HttpMethod::Post).is_some());
    }
}
