use std::collections::HashSet;

use crate::domain::{Article, SectionType, Template};

#[derive(Debug, Clone, PartialEq)]
pub struct SectionAssignment<'a> {
    pub section_type: SectionType,
    pub articles: Vec<&'a Article>,
}

/// Articles assigned to each section of a template, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution<'a> {
    assignments: Vec<SectionAssignment<'a>>,
}

impl<'a> Distribution<'a> {
    pub fn get(&self, section_type: SectionType) -> &[&'a Article] {
        self.assignments
            .iter()
            .find(|a| a.section_type == section_type)
            .map(|a| a.articles.as_slice())
            .unwrap_or(&[])
    }

    pub fn assignments(&self) -> &[SectionAssignment<'a>] {
        &self.assignments
    }

    pub fn placed_count(&self) -> usize {
        self.assignments.iter().map(|a| a.articles.len()).sum()
    }
}

/// Maps articles onto the sections of `template`.
///
/// Breaking items fill the breaking section first, up to its capacity. The
/// remaining sections then take consecutive runs of the general pool, which
/// must already be in priority order. Later sections go short when the pool
/// runs out.
pub fn distribute<'a>(
    articles: &'a [Article],
    breaking: &'a [Article],
    template: &Template,
) -> Distribution<'a> {
    let mut assignments: Vec<SectionAssignment<'a>> = template
        .sections
        .iter()
        .map(|s| SectionAssignment {
            section_type: s.section_type,
            articles: Vec::new(),
        })
        .collect();

    let mut placed_breaking: HashSet<&str> = HashSet::new();

    if let Some(index) = template
        .sections
        .iter()
        .position(|s| s.section_type == SectionType::Breaking && s.takes_articles())
    {
        let capacity = template.sections[index].max_articles;
        for article in breaking {
            if assignments[index].articles.len() == capacity {
                break;
            }
            // Two ticker entries may link the same article.
            if !placed_breaking.insert(article.id.as_str()) {
                continue;
            }
            assignments[index].articles.push(article);
        }
    }

    let pool: Vec<&'a Article> = articles
        .iter()
        .filter(|a| !placed_breaking.contains(a.id.as_str()))
        .collect();
    let mut cursor = 0;

    for (section, assignment) in template.sections.iter().zip(assignments.iter_mut()) {
        if section.section_type == SectionType::Breaking || !section.takes_articles() {
            continue;
        }
        let end = (cursor + section.max_articles).min(pool.len());
        assignment.articles.extend_from_slice(&pool[cursor..end]);
        cursor = end;
    }

    Distribution { assignments }
}
