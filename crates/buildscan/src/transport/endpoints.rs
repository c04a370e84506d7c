//! URL layout of the scan service.

use crate::model::ImageSet;

/// Builds endpoint URLs from the API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(api_base: &str) -> Self {
        Self {
            base: api_base.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn upload(&self) -> String {
        format!("{}/upload", self.base)
    }

    pub fn status(&self, job_id: &str) -> String {
        format!("{}/status/{}", self.base, job_id)
    }

    pub fn results_json(&self, job_id: &str) -> String {
        format!("{}/results/{}/json", self.base, job_id)
    }

    /// Download link for the results CSV.
    pub fn csv_export(&self, job_id: &str) -> String {
        format!("{}/results/{}", self.base, job_id)
    }

    /// Download link for the ZIP with results and compressed images.
    pub fn zip_export(&self, job_id: &str) -> String {
        format!("{}/download/{}/zip", self.base, job_id)
    }

    pub fn image_urls(&self, images: &ImageSet) -> Vec<String> {
        images
            .image_names()
            .iter()
            .map(|name| format!("{}/images/{}/{}", self.base, images.folder(), name))
            .collect()
    }

    pub fn health(&self) -> String {
        format!("{}/health", self.base)
    }

    pub fn rate_limit(&self) -> String {
        format!("{}/rate-limit", self.base)
    }

    pub fn jobs(&self) -> String {
        format!("{}/jobs", self.base)
    }
}
