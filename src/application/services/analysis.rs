//! Headless analysis service
//!
//! Implements the batch contract: read a request document, plan the merge on
//! an imported model, write the response document. Process management is left
//! to the caller.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::application::error_ext::IoResultExt;
use crate::application::services::merge::{MergeOutcome, MergeService};
use crate::application::wire::{AnalysisRequest, AnalysisResponse, ImportedScene};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{NameIndex, Topology};
use crate::infrastructure::traits::FileSystem;

/// Duplicate-name check of a request, without planning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateNames {
    pub avatar: Vec<String>,
    pub clothing: Vec<String>,
}

impl DuplicateNames {
    pub fn is_empty(&self) -> bool {
        self.avatar.is_empty() && self.clothing.is_empty()
    }
}

/// Service answering analysis requests.
pub struct AnalysisService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
    merge: MergeService,
}

impl AnalysisService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        let merge = MergeService::new(settings.strict_names);
        Self {
            fs,
            settings,
            merge,
        }
    }

    pub fn load_request(&self, path: &Path) -> ApplicationResult<AnalysisRequest> {
        debug!("load_request: {}", path.display());
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read request", path)?;
        AnalysisRequest::from_json(&content)
    }

    /// CLI override, then the request's own suffix, then the configured default.
    pub fn resolve_suffix(&self, request: &AnalysisRequest, cli_suffix: Option<&str>) -> String {
        cli_suffix
            .map(str::to_string)
            .or_else(|| Some(request.suffix.clone()).filter(|s| !s.trim().is_empty()))
            .or_else(|| self.settings.default_suffix.clone())
            .unwrap_or_default()
    }

    /// Dry run of the merge described by `request`.
    #[instrument(level = "debug", skip(self, request))]
    pub fn analyze(
        &self,
        request: &AnalysisRequest,
        cli_suffix: Option<&str>,
    ) -> ApplicationResult<AnalysisResponse> {
        let imported = request.import()?;
        let input = imported.merge_input(self.resolve_suffix(request, cli_suffix));
        let plan = self.merge.plan(&imported.scene, &input)?;
        Ok(AnalysisResponse::from(plan.report()))
    }

    /// Import the request and execute the merge on the imported model.
    #[instrument(level = "debug", skip(self, request))]
    pub fn merge(
        &self,
        request: &AnalysisRequest,
        cli_suffix: Option<&str>,
    ) -> ApplicationResult<(ImportedScene, MergeOutcome)> {
        let mut imported = request.import()?;
        let input = imported.merge_input(self.resolve_suffix(request, cli_suffix));
        let outcome = self.merge.merge(&mut imported.scene, &input)?;
        Ok((imported, outcome))
    }

    pub fn duplicates(&self, request: &AnalysisRequest) -> ApplicationResult<DuplicateNames> {
        let ImportedScene {
            scene,
            avatar_root,
            clothing_root,
            ..
        } = request.import()?;
        let nested = scene.is_within(clothing_root, avatar_root)?;
        Ok(DuplicateNames {
            avatar: NameIndex::build_excluding(&scene, avatar_root, nested.then_some(clothing_root))
                .duplicate_names(),
            clothing: NameIndex::build(&scene, clothing_root).duplicate_names(),
        })
    }

    pub fn render_response(&self, response: &AnalysisResponse) -> ApplicationResult<String> {
        response.to_json(self.settings.pretty_json)
    }

    /// Write the response, creating the output's parent directories.
    pub fn write_response(&self, response: &AnalysisResponse, path: &Path) -> ApplicationResult<()> {
        let content = self.render_response(response)?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create output directory", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write response", path)
    }

    /// Batch contract: `input` request in, `output` response out.
    #[instrument(level = "debug", skip(self))]
    pub fn analyze_file(
        &self,
        input: &Path,
        output: &Path,
        cli_suffix: Option<&str>,
    ) -> ApplicationResult<AnalysisResponse> {
        let request = self.load_request(input)?;
        let response = self.analyze(&request, cli_suffix)?;
        self.write_response(&response, output)?;
        info!(
            "analysis written to {}: {} warning(s)",
            output.display(),
            response.warnings.len()
        );
        Ok(response)
    }
}
