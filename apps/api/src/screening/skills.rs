//! Skill Detector — finds vocabulary skills mentioned in extracted CV text.
//!
//! Pure and deterministic: output order follows vocabulary order, and each
//! skill appears at most once (case-insensitive).

use std::collections::HashSet;

use crate::screening::vocabulary::SkillVocabulary;

/// Returns the normalized names of every vocabulary skill found in `text`.
///
/// Empty text, or text with no vocabulary hits, yields an empty list. Any
/// fallback is the caller's decision.
pub fn detect_skills(text: &str, vocabulary: &SkillVocabulary) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![];
    }

    let mut seen = HashSet::new();
    vocabulary
        .skills()
        .filter(|skill| skill.matcher.is_match(text))
        .filter(|skill| seen.insert(skill.normalized.to_lowercase()))
        .map(|skill| skill.normalized.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::vocabulary::{DomainSpec, SkillSpec, VocabularySpec};

    fn builtin() -> SkillVocabulary {
        SkillVocabulary::builtin().unwrap()
    }

    fn has_no_case_insensitive_duplicates(skills: &[String]) -> bool {
        let lowered: HashSet<String> = skills.iter().map(|s| s.to_lowercase()).collect();
        lowered.len() == skills.len()
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(detect_skills("", &builtin()).is_empty());
        assert!(detect_skills("   \n\t", &builtin()).is_empty());
    }

    #[test]
    fn test_text_without_vocabulary_yields_nothing() {
        let text = "Experienced barista and latte artist with excellent people skills.";
        assert!(detect_skills(text, &builtin()).is_empty());
    }

    #[test]
    fn test_detects_across_domains() {
        let text = "Built REST services in Python on AWS with PostgreSQL; ran Scrum ceremonies.";
        let skills = detect_skills(text, &builtin());
        for expected in ["Python", "PostgreSQL", "AWS", "Scrum", "REST"] {
            assert!(skills.contains(&expected.to_string()), "missing {expected} in {skills:?}");
        }
    }

    #[test]
    fn test_case_family_rendered_title_case() {
        let skills = detect_skills("REACT, angular and vUE dashboards", &builtin());
        assert!(skills.contains(&"React".to_string()));
        assert!(skills.contains(&"Angular".to_string()));
        assert!(skills.contains(&"Vue".to_string()));
    }

    #[test]
    fn test_node_variants_collapse() {
        let skills = detect_skills("nodejs at work, NODE.JS at home, Node.js everywhere", &builtin());
        assert_eq!(skills.iter().filter(|s| s.as_str() == "Node.js").count(), 1);
        assert!(!skills.iter().any(|s| s.eq_ignore_ascii_case("nodejs")));
    }

    #[test]
    fn test_ux_variants_collapse() {
        let skills = detect_skills(
            "Focus on user experience and user interface polish; ui/ux lead.",
            &builtin(),
        );
        assert_eq!(skills, vec!["UI/UX".to_string()]);
    }

    #[test]
    fn test_other_matches_use_vocabulary_spelling() {
        let skills = detect_skills("postgresql and KUBERNETES", &builtin());
        assert_eq!(skills, vec!["PostgreSQL".to_string(), "Kubernetes".to_string()]);
    }

    #[test]
    fn test_word_boundaries_respected() {
        // "Go" inside "Google", "Java" inside "JavaScript", "AI" inside "said".
        let skills = detect_skills("Google said JavaScript", &builtin());
        assert_eq!(skills, vec!["JavaScript".to_string()]);
    }

    #[test]
    fn test_punctuated_skills() {
        let skills = detect_skills("C++ and C# engineer", &builtin());
        assert!(skills.contains(&"C++".to_string()));
        assert!(skills.contains(&"C#".to_string()));
    }

    #[test]
    fn test_deterministic() {
        let text = "Docker Kubernetes Rust Go GraphQL Figma TensorFlow Agile";
        let vocab = builtin();
        let first = detect_skills(text, &vocab);
        for _ in 0..5 {
            assert_eq!(detect_skills(text, &vocab), first);
        }
    }

    #[test]
    fn test_output_drawn_from_vocabulary_without_duplicates() {
        let vocab = builtin();
        let forms: HashSet<&str> = vocab.normalized_forms().collect();
        let samples = [
            "react React REACT node.js NodeJS",
            "SQL MySQL sql PostgreSQL user experience UI/UX",
            "Machine Learning, AI, Data Science, NLP, machine   learning",
            "Adobe XD, Sketch, InVision, Zeplin, prototyping and design systems",
        ];
        for text in samples {
            let skills = detect_skills(text, &vocab);
            assert!(has_no_case_insensitive_duplicates(&skills), "{skills:?}");
            for s in &skills {
                assert!(forms.contains(s.as_str()), "{s} not in vocabulary");
            }
        }
    }

    #[test]
    fn test_duplicate_entries_across_domains_deduplicated() {
        let spec = VocabularySpec {
            version: "dup".to_string(),
            domains: vec![
                DomainSpec {
                    name: "a".to_string(),
                    skills: vec![SkillSpec {
                        name: "SQL".to_string(),
                        aliases: vec![],
                        normalize: Default::default(),
                    }],
                },
                DomainSpec {
                    name: "b".to_string(),
                    skills: vec![SkillSpec {
                        name: "sql".to_string(),
                        aliases: vec![],
                        normalize: Default::default(),
                    }],
                },
            ],
        };
        let vocab = SkillVocabulary::compile(&spec).unwrap();
        assert_eq!(detect_skills("Advanced SQL", &vocab), vec!["SQL".to_string()]);
    }
}
