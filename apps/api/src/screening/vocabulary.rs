//! Skill vocabulary: an immutable, versioned table of skill names and the
//! surface forms that match them, grouped by domain.
//!
//! The built-in table can be replaced at startup from a JSON file with the
//! same shape as `VocabularySpec`.

use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BUILTIN_VERSION: &str = "2024.1";

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("Vocabulary version must not be empty")]
    MissingVersion,

    #[error("Empty skill name or alias in domain '{0}'")]
    EmptyTerm(String),

    #[error("Invalid pattern for skill '{skill}': {source}")]
    Pattern {
        skill: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse vocabulary file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How a matched skill is rendered in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// The skill name exactly as the vocabulary spells it.
    #[default]
    Verbatim,
    /// Title case of the skill name (`react` -> `React`).
    TitleCase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSpec {
    pub name: String,
    /// Further surface forms that collapse to `name`.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub normalize: Normalization,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSpec {
    pub name: String,
    pub skills: Vec<SkillSpec>,
}

/// Serializable form of a vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularySpec {
    pub version: String,
    pub domains: Vec<DomainSpec>,
}

#[derive(Debug)]
pub(crate) struct CompiledSkill {
    pub(crate) normalized: String,
    pub(crate) matcher: Regex,
}

#[derive(Debug)]
pub(crate) struct CompiledDomain {
    pub(crate) name: String,
    pub(crate) skills: Vec<CompiledSkill>,
}

/// Compiled vocabulary. Cheap to share behind an `Arc`; never mutated.
#[derive(Debug)]
pub struct SkillVocabulary {
    version: String,
    domains: Vec<CompiledDomain>,
}

impl SkillVocabulary {
    pub fn compile(spec: &VocabularySpec) -> Result<Self, VocabularyError> {
        if spec.version.trim().is_empty() {
            return Err(VocabularyError::MissingVersion);
        }

        let mut domains = Vec::with_capacity(spec.domains.len());
        for domain in &spec.domains {
            let mut skills = Vec::with_capacity(domain.skills.len());
            for skill in &domain.skills {
                let forms: Vec<&str> = std::iter::once(skill.name.as_str())
                    .chain(skill.aliases.iter().map(String::as_str))
                    .map(str::trim)
                    .collect();
                if forms.iter().any(|f| f.is_empty()) {
                    return Err(VocabularyError::EmptyTerm(domain.name.clone()));
                }

                let matcher = build_matcher(&forms).map_err(|source| VocabularyError::Pattern {
                    skill: skill.name.clone(),
                    source,
                })?;
                let normalized = match skill.normalize {
                    Normalization::Verbatim => skill.name.trim().to_string(),
                    Normalization::TitleCase => title_case(skill.name.trim()),
                };
                skills.push(CompiledSkill { normalized, matcher });
            }
            domains.push(CompiledDomain {
                name: domain.name.clone(),
                skills,
            });
        }

        Ok(SkillVocabulary {
            version: spec.version.clone(),
            domains,
        })
    }

    pub fn builtin() -> Result<Self, VocabularyError> {
        Self::compile(&builtin_spec())
    }

    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let raw = std::fs::read_to_string(path)?;
        let spec: VocabularySpec = serde_json::from_str(&raw)?;
        Self::compile(&spec)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn domain_names(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(|d| d.name.as_str())
    }

    pub(crate) fn skills(&self) -> impl Iterator<Item = &CompiledSkill> {
        self.domains.iter().flat_map(|d| d.skills.iter())
    }

    /// Every string the detector can emit.
    pub fn normalized_forms(&self) -> impl Iterator<Item = &str> {
        self.skills().map(|s| s.normalized.as_str())
    }
}

/// Case-insensitive alternation of the surface forms, anchored on word
/// boundaries. Boundaries are explicit non-word characters rather than `\b`
/// so forms ending in punctuation (`C++`, `C#`) still match.
fn build_matcher(forms: &[&str]) -> Result<Regex, regex::Error> {
    let mut escaped: Vec<String> = forms
        .iter()
        .map(|f| regex::escape(f).replace(' ', r"\s+"))
        .collect();
    // Longest first so a form is never shadowed by its own prefix.
    escaped.sort_by(|a, b| b.len().cmp(&a.len()));

    RegexBuilder::new(&format!(r"(?:^|\W)(?:{})(?:\W|$)", escaped.join("|")))
        .case_insensitive(true)
        .build()
}

pub(crate) fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn skill(name: &str) -> SkillSpec {
    SkillSpec {
        name: name.to_string(),
        aliases: vec![],
        normalize: Normalization::Verbatim,
    }
}

fn aliased(name: &str, aliases: &[&str]) -> SkillSpec {
    SkillSpec {
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        ..skill(name)
    }
}

fn titled(name: &str) -> SkillSpec {
    SkillSpec {
        normalize: Normalization::TitleCase,
        ..skill(name)
    }
}

fn domain(name: &str, skills: Vec<SkillSpec>) -> DomainSpec {
    DomainSpec {
        name: name.to_string(),
        skills,
    }
}

fn plain(names: &[&str]) -> Vec<SkillSpec> {
    names.iter().map(|n| skill(n)).collect()
}

/// The built-in vocabulary.
pub fn builtin_spec() -> VocabularySpec {
    let mut frameworks = vec![titled("react"), titled("angular"), titled("vue")];
    frameworks.extend(plain(&["JavaScript", "TypeScript"]));
    frameworks.push(aliased("Node.js", &["NodeJS"]));
    frameworks.extend(plain(&["Express", "Django", "Flask", "Spring", "Laravel"]));

    let ux = vec![
        aliased("UI/UX", &["User Experience", "User Interface"]),
        skill("Design Systems"),
    ];

    VocabularySpec {
        version: BUILTIN_VERSION.to_string(),
        domains: vec![
            domain("frameworks", frameworks),
            domain(
                "languages",
                plain(&["Python", "Java", "C++", "C#", "Go", "Rust", "PHP", "Ruby", "Swift", "Kotlin"]),
            ),
            domain(
                "styling",
                plain(&["HTML", "CSS", "SCSS", "SASS", "Bootstrap", "Tailwind", "Material-UI"]),
            ),
            domain(
                "data_stores",
                plain(&["SQL", "MySQL", "PostgreSQL", "MongoDB", "Redis", "Elasticsearch"]),
            ),
            domain(
                "cloud_devops",
                plain(&["AWS", "Azure", "GCP", "Docker", "Kubernetes", "Jenkins", "Git", "GitHub", "GitLab"]),
            ),
            domain(
                "design_tools",
                plain(&["Figma", "Sketch", "Adobe XD", "InVision", "Zeplin", "Prototyping"]),
            ),
            domain("ux", ux),
            domain(
                "ml_ai",
                plain(&["Machine Learning", "AI", "Data Science", "TensorFlow", "PyTorch", "NLP"]),
            ),
            domain(
                "process",
                plain(&["Agile", "Scrum", "Kanban", "JIRA", "Confluence", "Trello"]),
            ),
            domain(
                "api_architecture",
                plain(&["REST", "GraphQL", "API", "Microservices", "Serverless"]),
            ),
        ],
    }
}
