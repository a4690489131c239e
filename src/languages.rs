// src/languages.rs

use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

const LANGUAGES_JSON: &str = include_str!("languages.json");

#[derive(Debug, Deserialize)]
struct Language {
    name: String,
    extensions: Vec<String>,
}

/// Built-in map from lower-cased language name to file extensions
#[derive(Debug)]
pub struct LanguageTable {
    extensions: HashMap<String, Vec<String>>,
}

impl LanguageTable {
    pub fn load() -> Result<Self> {
        let languages: Vec<Language> = serde_json::from_str(LANGUAGES_JSON)?;
        let extensions = languages
            .into_iter()
            .map(|l| (l.name.to_lowercase(), l.extensions))
            .collect();
        Ok(Self { extensions })
    }

    pub fn get(&self, language: &str) -> Option<&[String]> {
        self.extensions.get(&language.to_lowercase()).map(Vec::as_slice)
    }

    /// Extensions of every known language in `languages`; unknown names
    /// are skipped.
    pub fn extensions_for(&self, languages: &[String]) -> Vec<String> {
        let mut out = Vec::new();
        for language in languages {
            match self.get(language) {
                Some(exts) => out.extend(exts.iter().cloned()),
                None => warn!("Unknown language '{}', ignoring", language),
            }
        }
        out
    }
}
