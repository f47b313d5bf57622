//! Learning-materials lookup: a static dataset mapping modifier codes to
//! curated resources. A remote document is preferred when a URL is
//! configured, with the bundled copy as fallback; results filter client-side
//! by `source` and `type` facets.

use serde::{Deserialize, Serialize};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "assets/content/"]
struct MaterialAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LearningMaterial {
    pub filename: String,
    pub path: String,
    pub folder: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub link: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialMapping {
    pub code: u8,
    pub name: String,
    pub material_count: usize,
    pub materials: Vec<LearningMaterial>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MaterialIndex {
    pub generated_at: String,
    pub vault_name: String,
    pub mappings: Vec<MaterialMapping>,
}

impl MaterialIndex {
    /// Remote document preferred, bundled dataset as fallback, empty index
    /// when both are missing — lookups then simply return nothing.
    pub fn load(remote_url: Option<&str>) -> Self {
        if let Some(url) = remote_url {
            if let Some(body) = fetch_document(url) {
                if let Ok(index) = serde_json::from_str::<MaterialIndex>(&body) {
                    return index;
                }
            }
        }
        Self::bundled()
    }

    pub fn bundled() -> Self {
        MaterialAssets::get("materials.json")
            .and_then(|file| serde_json::from_slice(file.data.as_ref()).ok())
            .unwrap_or_default()
    }

    pub fn by_code(&self, code: u8) -> &[LearningMaterial] {
        self.mappings
            .iter()
            .find(|m| m.code == code)
            .map(|m| m.materials.as_slice())
            .unwrap_or(&[])
    }

    pub fn sources(materials: &[LearningMaterial]) -> Vec<String> {
        let mut out: Vec<String> = materials.iter().map(|m| m.source.clone()).collect();
        out.sort();
        out.dedup();
        out
    }

    pub fn kinds(materials: &[LearningMaterial]) -> Vec<String> {
        let mut out: Vec<String> = materials.iter().map(|m| m.kind.clone()).collect();
        out.sort();
        out.dedup();
        out
    }

    pub fn filter<'a>(
        materials: &'a [LearningMaterial],
        source: Option<&str>,
        kind: Option<&str>,
    ) -> Vec<&'a LearningMaterial> {
        materials
            .iter()
            .filter(|m| source.is_none_or(|s| m.source == s))
            .filter(|m| kind.is_none_or(|k| m.kind == k))
            .collect()
    }
}

#[cfg(feature = "network")]
fn fetch_document(url: &str) -> Option<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .ok()?;
    let response = client.get(url).send().ok()?;
    if response.status().is_success() {
        response.text().ok()
    } else {
        None
    }
}

#[cfg(not(feature = "network"))]
fn fetch_document(_url: &str) -> Option<String> {
    None
}
