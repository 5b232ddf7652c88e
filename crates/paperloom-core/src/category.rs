//! Topic category definitions
//!
//! A small builtin taxonomy ships in code; a user-editable JSON file may add
//! categories or extra keywords. The effective keyword set for an id is the
//! union of builtin and user keywords.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryFile {
    #[serde(default)]
    categories: Vec<Category>,
}

/// Ordered category definitions. Definition order is significant: it breaks
/// ties when two categories match a record equally often.
#[derive(Debug, Clone)]
pub struct CategorySet {
    categories: Vec<Category>,
}

fn builtin(id: &str, name: &str, keywords: &[&str]) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        description: None,
    }
}

impl CategorySet {
    /// The builtin taxonomy, without any user additions.
    pub fn builtin() -> Self {
        Self {
            categories: vec![
                builtin(
                    "agents",
                    "Agents",
                    &[
                        "agent",
                        "multi-agent",
                        "tool use",
                        "tool-use",
                        "autonomous",
                        "planning",
                    ],
                ),
                builtin(
                    "reasoning",
                    "Reasoning",
                    &[
                        "reasoning",
                        "chain-of-thought",
                        "chain of thought",
                        "theorem proving",
                        "deduction",
                    ],
                ),
                builtin(
                    "multimodal",
                    "Multimodal",
                    &[
                        "multimodal",
                        "vision-language",
                        "image generation",
                        "video understanding",
                        "speech",
                    ],
                ),
                builtin(
                    "retrieval",
                    "Retrieval",
                    &[
                        "retrieval",
                        "rag",
                        "retrieval-augmented",
                        "dense retrieval",
                        "search",
                    ],
                ),
                builtin(
                    "training",
                    "Training & Efficiency",
                    &[
                        "fine-tuning",
                        "pretraining",
                        "quantization",
                        "distillation",
                        "reinforcement learning",
                        "rlhf",
                    ],
                ),
                builtin(
                    "safety",
                    "Safety & Alignment",
                    &[
                        "alignment",
                        "safety",
                        "jailbreak",
                        "red team",
                        "interpretability",
                    ],
                ),
                builtin(
                    "evaluation",
                    "Evaluation",
                    &["benchmark", "evaluation", "leaderboard", "llm-as-a-judge"],
                ),
            ],
        }
    }

    /// Builtin taxonomy merged with a user definitions file. A missing file
    /// yields the builtins unchanged.
    pub fn load(path: &Path) -> Result<Self> {
        let mut set = Self::builtin();
        if !path.exists() {
            log::debug!("no category file at {}, using builtins", path.display());
            return Ok(set);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read category file {}", path.display()))?;
        let file: CategoryFile = serde_json::from_str(&content)
            .with_context(|| format!("invalid category file {}", path.display()))?;
        set.merge(file.categories);
        log::info!(
            "loaded category definitions from {} ({} total)",
            path.display(),
            set.categories.len()
        );
        Ok(set)
    }

    /// Fold user definitions in: extra keywords for known ids, new categories
    /// appended in file order.
    pub(crate) fn merge(&mut self, defs: Vec<Category>) {
        for mut def in defs {
            def.keywords = def.keywords.iter().map(|k| k.to_lowercase()).collect();
            match self.categories.iter_mut().find(|c| c.id == def.id) {
                Some(existing) => {
                    for kw in def.keywords {
                        if !existing.keywords.contains(&kw) {
                            existing.keywords.push(kw);
                        }
                    }
                    if def.description.is_some() {
                        existing.description = def.description;
                    }
                }
                None => self.categories.push(def),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
