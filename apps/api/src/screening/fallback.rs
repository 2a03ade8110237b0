//! Demo fallback: representative skill sets substituted when nothing was
//! detected in a CV. Disabled unless `FALLBACK_ON_EMPTY_SKILLS=true`, since it
//! injects synthetic data into persisted records.

const ROTATION: &[&[&str]] = &[
    &["React", "TypeScript", "Node.js", "GraphQL", "AWS", "Docker"],
    &["Python", "Django", "PostgreSQL", "REST APIs", "Docker", "AWS"],
    &["Figma", "UI/UX", "Prototyping", "User Research", "Design Systems"],
    &["JavaScript", "Vue.js", "CSS", "HTML", "Git", "Webpack"],
    &["SQL", "Python", "Tableau", "Power BI", "Data Analysis", "Statistics"],
    &["Java", "Spring Boot", "Microservices", "Docker", "Kubernetes"],
    &["Google Analytics", "SEO", "SEM", "Content Marketing", "HubSpot"],
    &["Sketch", "InVision", "Principle", "Wireframing", "Usability Testing"],
];

/// Substituted skills and the synthetic text that replaces the extracted text.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackSkills {
    pub skills: Vec<String>,
    pub summary_text: String,
}

/// Picks the rotation entry for the document at `position` in its batch.
pub fn fallback_for(position: usize, file_name: &str) -> FallbackSkills {
    let skills: Vec<String> = ROTATION[position % ROTATION.len()]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let headline = skills.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
    FallbackSkills {
        summary_text: format!(
            "Extracted content from {file_name}... This CV contains skills in {headline}..."
        ),
        skills,
    }
}
