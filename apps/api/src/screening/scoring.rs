use crate::models::cv_match::MatchStatus;

/// Share of a CV's skills that appear in the job requirements, as an integer percentage.
///
/// `floor(100 * matched / total)`, where a skill matches when its lowercase
/// form is a substring of the lowercased requirements. No skills scores 0.
pub fn match_score(skills: &[String], requirements: &str) -> u8 {
    if skills.is_empty() {
        return 0;
    }

    let requirements_lower = requirements.to_lowercase();
    let matched = skills
        .iter()
        .filter(|skill| requirements_lower.contains(&skill.to_lowercase()))
        .count();

    // matched <= len, so the quotient is at most 100
    ((100 * matched) / skills.len()) as u8
}

/// Score and the status derived from it.
pub fn score_and_status(skills: &[String], requirements: &str) -> (u8, MatchStatus) {
    let score = match_score(skills, requirements);
    (score, MatchStatus::from_score(score))
}
