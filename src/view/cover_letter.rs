//! The cover-letter preview.
//!
//! The letter body is composed from the record: the target job type, the
//! career objective, the first listed role and up to five skills. A record
//! without work history gets the recent-graduate wording instead.

use super::layout::{Align, Block, DocumentSurface};
use super::Theme;
use crate::record::{non_blank, CvRecord};
use chrono::NaiveDate;

/// Skills quoted in the letter body.
const LETTER_SKILL_COUNT: usize = 5;

/// Format a date the way the letter header prints it, e.g. `18 October 2026`.
pub fn format_letter_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Paragraphs of the letter body, greeting and sign-off included.
pub fn compose_letter(record: &CvRecord) -> Vec<String> {
    let job_type = record.job_type.trim();
    let field = job_type.to_lowercase();
    let skills = record
        .skills
        .iter()
        .take(LETTER_SKILL_COUNT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let mut interest = format!(
        "I am writing to express my strong interest in the {job_type} position at your esteemed organization."
    );
    if let Some(objective) = non_blank(Some(record.career_objective.as_str())) {
        interest.push(' ');
        interest.push_str(objective);
    }

    let skills_clause = if skills.is_empty() {
        String::from("I have developed strong skills")
    } else {
        format!("I have developed strong skills in {skills}")
    };
    let experience = match record.work_experience.first() {
        Some(first) => format!(
            "With {} years of experience in {field}, {skills_clause}. In my previous role as {} at {}, \
I successfully contributed to various projects and gained valuable experience that directly aligns \
with your requirements.",
            record.work_experience.len(),
            first.job_title,
            first.company,
        ),
        None => format!(
            "With experience in {field}, {skills_clause}. As a recent graduate, I am eager to apply my \
knowledge and skills in a professional environment."
        ),
    };

    vec![
        "Dear Hiring Manager,".to_string(),
        interest,
        experience,
        format!(
            "I am particularly drawn to your organization because of its reputation for excellence and \
innovation. I am confident that my technical skills, combined with my passion for {field}, make me an \
ideal candidate for this position."
        ),
        "I would welcome the opportunity to discuss how my background and enthusiasm can contribute to \
your team's success. Thank you for considering my application. I look forward to hearing from you soon."
            .to_string(),
        "Yours sincerely,".to_string(),
    ]
}

/// Blocks of the cover letter: right-aligned sender header, rule, body.
pub fn cover_letter_blocks(record: &CvRecord, date: NaiveDate) -> Vec<Block> {
    let info = &record.personal_info;
    let meta = |text: &str| Block::Meta {
        text: text.to_string(),
        align: Align::Right,
    };

    let mut blocks: Vec<Block> = [
        Some(info.full_name.as_str()),
        Some(info.email.as_str()),
        Some(info.phone.as_str()),
        info.address.as_deref(),
    ]
    .into_iter()
    .filter_map(non_blank)
    .map(meta)
    .collect();
    blocks.push(Block::Spacer(12));
    blocks.push(meta(&format_letter_date(date)));
    blocks.push(Block::Rule);
    blocks.push(Block::Spacer(8));

    blocks.extend(compose_letter(record).into_iter().map(Block::Paragraph));
    blocks.push(Block::Subheading(info.full_name.clone()));
    blocks
}

/// Lay out the cover-letter preview surface.
pub fn layout_cover_letter(record: &CvRecord, date: NaiveDate, theme: Theme) -> DocumentSurface {
    DocumentSurface::layout(&cover_letter_blocks(record, date), theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::WorkExperience;

    fn record() -> CvRecord {
        let mut r = CvRecord::default();
        r.personal_info.full_name = "Ada Obi".into();
        r.job_type = "Software Engineering".into();
        r.career_objective = "I build dependable systems.".into();
        r.skills = ["Rust", "SQL", "Go", "Linux", "Git", "Docker"]
            .map(String::from)
            .to_vec();
        r
    }

    #[test]
    fn date_format_matches_letter_header() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(format_letter_date(date), "5 March 2026");
    }

    #[test]
    fn graduate_wording_without_work_history() {
        let letter = compose_letter(&record());
        assert_eq!(letter[0], "Dear Hiring Manager,");
        assert!(letter[1].contains("Software Engineering position"));
        assert!(letter[1].ends_with("I build dependable systems."));
        assert!(letter[2].contains("recent graduate"));
        assert!(letter[2].contains("software engineering"));
        assert!(!letter[2].contains("Docker"), "only five skills quoted");
        assert_eq!(letter.last().map(String::as_str), Some("Yours sincerely,"));
    }

    #[test]
    fn first_role_is_quoted() {
        let mut r = record();
        r
            .add_work_experience(WorkExperience {
                job_title: "Backend Engineer".into(),
                company: "Paystack".into(),
                ..Default::default()
            })
            .unwrap();
        r
            .add_work_experience(WorkExperience {
                job_title: "Intern".into(),
                company: "Andela".into(),
                ..Default::default()
            })
            .unwrap();
        let letter = compose_letter(&r);
        assert!(letter[2].starts_with("With 2 years of experience"));
        assert!(letter[2].contains("Backend Engineer at Paystack"));
    }

    #[test]
    fn header_skips_missing_address_and_signs_off() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let blocks = cover_letter_blocks(&record(), date);
        assert!(matches!(
            &blocks[0],
            Block::Meta { text, align: Align::Right } if text == "Ada Obi"
        ));
        assert!(blocks
            .iter()
            .any(|b| matches!(b, Block::Meta { text, .. } if text == "18 October 2026")));
        assert!(matches!(blocks.last(), Some(Block::Subheading(name)) if name == "Ada Obi"));
    }
}
