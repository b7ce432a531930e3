//! Textual recommendations derived from the user's newest resume.

use crate::types::{Insight, InsightType, ParsedContent, Priority, Resume};

const MIN_SKILLS: usize = 5;
const MIN_EXPERIENCE: usize = 2;

/// Insights for the newest resume, or for a user with none.
pub fn insights_for(latest: Option<&Resume>) -> Vec<Insight> {
    match latest {
        None => vec![Insight::new(
            "Upload Your First Resume",
            "Get started by uploading your resume to receive personalized insights and job recommendations.",
            InsightType::Suggestion,
            Priority::High,
        )],
        Some(Resume {
            parsed_content: None,
            ..
        }) => vec![Insight::new(
            "Resume Processing Complete",
            "Your resume has been uploaded successfully. Detailed analysis will appear here once it is parsed.",
            InsightType::Achievement,
            Priority::Medium,
        )],
        Some(Resume {
            parsed_content: Some(content),
            ..
        }) => content_insights(content),
    }
}

/// Returned when the resume could not be fetched at all.
pub fn default_insights() -> Vec<Insight> {
    vec![Insight::new(
        "Complete Your Profile",
        "Add more details to your profile to get better job matches.",
        InsightType::Suggestion,
        Priority::Medium,
    )]
}

/// Quality checks over parsed content. Each failed check adds one insight;
/// a profile passing all of them gets a single achievement.
pub fn content_insights(content: &ParsedContent) -> Vec<Insight> {
    let mut insights = Vec::new();

    if content.skills.as_ref().map_or(true, |s| s.len() < MIN_SKILLS) {
        insights.push(Insight::new(
            "Add More Skills",
            "Consider adding more relevant skills to make your profile more attractive to recruiters.",
            InsightType::Improvement,
            Priority::High,
        ));
    }

    if content
        .experience
        .as_ref()
        .map_or(true, |e| e.len() < MIN_EXPERIENCE)
    {
        insights.push(Insight::new(
            "Expand Experience Section",
            "Add more details about your work experience and the impact you had in each role.",
            InsightType::Improvement,
            Priority::Medium,
        ));
    }

    if content.education.as_ref().map_or(true, Vec::is_empty) {
        insights.push(Insight::new(
            "Add Education Details",
            "Include your educational background to give recruiters a complete picture.",
            InsightType::Suggestion,
            Priority::Low,
        ));
    }

    if insights.is_empty() {
        insights.push(Insight::new(
            "Excellent Profile!",
            "Your resume looks comprehensive. Keep it updated with your latest achievements.",
            InsightType::Achievement,
            Priority::Low,
        ));
    }

    insights
}
