use std::collections::HashSet;

use crate::domain::{Template, TemplateSummary};
use crate::errors::{EpaperError, EpaperResult};
use crate::templates::builtin;

/// Immutable set of layouts keyed by id, in registration order.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the shipped layouts.
    pub fn builtin() -> EpaperResult<Self> {
        let mut registry = Self::new();
        for template in builtin::all() {
            registry.register(template)?;
        }
        Ok(registry)
    }

    /// Adds a template after checking its geometry. Existing ids are never replaced.
    pub fn register(&mut self, template: Template) -> EpaperResult<()> {
        if self.get(&template.id).is_some() {
            return Err(EpaperError::InvalidTemplate(format!(
                "template '{}' is already registered",
                template.id
            )));
        }
        validate(&template)?;
        self.templates.push(template);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn require(&self, id: &str) -> EpaperResult<&Template> {
        self.get(id)
            .ok_or_else(|| EpaperError::TemplateNotFound(id.to_string()))
    }

    pub fn list(&self) -> Vec<TemplateSummary> {
        self.templates.iter().map(Template::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn validate(template: &Template) -> EpaperResult<()> {
    let invalid =
        |msg: String| Err(EpaperError::InvalidTemplate(format!("{}: {}", template.id, msg)));

    if template.id.trim().is_empty() {
        return Err(EpaperError::InvalidTemplate("template id is empty".to_string()));
    }
    if template.sections.is_empty() {
        return invalid("template has no sections".to_string());
    }

    let area = template.content_area();
    if area.width <= 0.0 || area.height <= 0.0 {
        return invalid("margins leave no printable area".to_string());
    }

    let mut seen = HashSet::new();
    for section in &template.sections {
        let kind = section.section_type;
        if !seen.insert(kind) {
            return invalid(format!("section '{}' declared twice", kind));
        }
        if section.rect.width <= 0.0 || section.rect.height <= 0.0 {
            return invalid(format!("section '{}' has an empty rectangle", kind));
        }
        if !area.contains(&section.rect) {
            return invalid(format!("section '{}' lies outside the printable area", kind));
        }
        if kind.is_static() && section.max_articles != 0 {
            return invalid(format!("section '{}' cannot hold articles", kind));
        }
        if let Some(limit) = section.strategy.cell_limit() {
            if section.max_articles > limit {
                return invalid(format!(
                    "section '{}' holds {} articles but {} layout fits {}",
                    kind, section.max_articles, section.strategy, limit
                ));
            }
        }
    }

    for (i, a) in template.sections.iter().enumerate() {
        for b in &template.sections[i + 1..] {
            if a.rect.overlaps(&b.rect) {
                return invalid(format!(
                    "sections '{}' and '{}' overlap",
                    a.section_type, b.section_type
                ));
            }
        }
    }

    Ok(())
}
