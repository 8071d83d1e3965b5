//! The CV preview.

use super::layout::{Align, Block, DocumentSurface};
use super::Theme;
use crate::record::{non_blank, CvRecord};

/// Blocks of the CV, in reading order. Sections with no content are left out.
pub fn cv_blocks(record: &CvRecord) -> Vec<Block> {
    let info = &record.personal_info;
    let mut blocks = vec![Block::Title {
        text: info.full_name.clone(),
        align: Align::Center,
    }];

    let contact: Vec<&str> = [
        Some(info.email.as_str()),
        Some(info.phone.as_str()),
        info.address.as_deref(),
    ]
    .into_iter()
    .filter_map(non_blank)
    .collect();
    if !contact.is_empty() {
        blocks.push(Block::Meta {
            text: contact.join("  ·  "),
            align: Align::Center,
        });
    }
    let links = info.links();
    if !links.is_empty() {
        blocks.push(Block::Meta {
            text: links.join("  ·  "),
            align: Align::Center,
        });
    }

    if let Some(objective) = non_blank(Some(record.career_objective.as_str())) {
        blocks.push(Block::Heading("Career Objective".into()));
        blocks.push(Block::Paragraph(objective.to_string()));
    }

    if !record.work_experience.is_empty() {
        blocks.push(Block::Heading("Work Experience".into()));
        for job in &record.work_experience {
            blocks.push(Block::Subheading(job.job_title.clone()));
            blocks.push(Block::Accent(job.company.clone()));
            if let Some(location) = non_blank(Some(job.location.as_str())) {
                blocks.push(Block::Meta {
                    text: location.to_string(),
                    align: Align::Left,
                });
            }
            blocks.push(Block::Meta {
                text: job.period(),
                align: Align::Right,
            });
            blocks.extend(
                job.responsibilities
                    .iter()
                    .filter(|r| !r.trim().is_empty())
                    .map(|r| Block::Bullet(r.clone())),
            );
            blocks.push(Block::Spacer(10));
        }
    }

    if !record.education.is_empty() {
        blocks.push(Block::Heading("Education".into()));
        for edu in &record.education {
            blocks.push(Block::Subheading(edu.degree.clone()));
            blocks.push(Block::Accent(edu.institution.clone()));
            if let Some(location) = non_blank(Some(edu.location.as_str())) {
                blocks.push(Block::Meta {
                    text: location.to_string(),
                    align: Align::Left,
                });
            }
            let dates: Vec<&str> = [Some(edu.graduation_year.as_str()), edu.grade.as_deref()]
                .into_iter()
                .filter_map(non_blank)
                .collect();
            if !dates.is_empty() {
                blocks.push(Block::Meta {
                    text: dates.join("  ·  "),
                    align: Align::Right,
                });
            }
            blocks.push(Block::Spacer(8));
        }
    }

    if let Some(summary) = record.national_service.as_ref().and_then(|s| s.summary()) {
        blocks.push(Block::Heading("National Service".into()));
        blocks.push(Block::Paragraph(summary));
    }

    if !record.skills.is_empty() {
        blocks.push(Block::Heading("Skills".into()));
        blocks.push(Block::Chips(record.skills.clone()));
    }

    if !record.certifications.is_empty() {
        blocks.push(Block::Heading("Certifications & Training".into()));
        blocks.extend(record.certifications.iter().cloned().map(Block::Bullet));
    }

    blocks
}

/// Lay out the CV preview surface.
pub fn layout_cv(record: &CvRecord, theme: Theme) -> DocumentSurface {
    DocumentSurface::layout(&cv_blocks(record), theme)
}
