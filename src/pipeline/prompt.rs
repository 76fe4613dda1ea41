//! Prompt assembly from a reconciled document model.
//!
//! The assembler is the seam where a generative collaborator would sit. The
//! built-in implementation is purely lexical: it lays the model's sections out
//! under fixed headings so the quality stage has an artifact to score.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::structuring::{DocumentModel, ProjectContext, Section, SectionType};

/// Renders a document model (and optional project context) into a prompt.
pub trait PromptAssembler: Send + Sync {
    fn assemble(&self, model: &DocumentModel, project: &ProjectContext) -> String;
}

/// Features named after "implement" in requirement and implementation text.
static IMPLEMENT_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)implement\s+(\w+)").unwrap());

const MAX_TASK_FEATURES: usize = 3;
const MAX_LISTED_PATHS: usize = 10;

const GUIDELINES: [&str; 4] = [
    "Follow the technical specifications and requirements outlined above",
    "Adhere to the coding style and conventions of the existing project",
    "Include comprehensive error handling and logging",
    "Be compatible with the existing codebase architecture",
];

/// `# Context / # Requirements / # Constraints / # Task` layout.
#[derive(Debug, Default, Clone)]
pub struct MarkdownPromptAssembler;

impl PromptAssembler for MarkdownPromptAssembler {
    fn assemble(&self, model: &DocumentModel, project: &ProjectContext) -> String {
        let mut parts = vec![
            "# Context".to_string(),
            context_block(model, project),
            "# Requirements".to_string(),
            body_of(model, &[SectionType::Requirements, SectionType::Performance])
                .unwrap_or_else(|| "No explicit requirements were found in the source document.".into()),
            "# Constraints".to_string(),
        ];

        if let Some(body) = body_of(model, &[SectionType::Interfaces, SectionType::Security]) {
            parts.push(body);
        }
        parts.push(
            GUIDELINES
                .iter()
                .map(|g| format!("- {g}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );

        parts.push("# Task".to_string());
        parts.push(task_block(model));

        parts.join("\n\n")
    }
}

fn context_block(model: &DocumentModel, project: &ProjectContext) -> String {
    let mut lines = Vec::new();

    if let Some(body) = body_of(model, &[SectionType::SystemOverview, SectionType::General]) {
        lines.push(body);
    }

    if !model.entities.is_empty() {
        let entities = model
            .entities
            .iter()
            .map(|(class, found)| format!("- {class}: {}", found.join(", ")))
            .collect::<Vec<_>>()
            .join("\n");
        lines.push(format!("Domain entities:\n{entities}"));
    }

    if project.is_empty() {
        lines.push("No existing project structure to analyze.".into());
    } else {
        let listed = project
            .structure
            .iter()
            .take(MAX_LISTED_PATHS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!(
            "## Existing Project Structure\n\n\
             - Code Files: {}\n\
             - Configuration Files: {}\n\
             - Documentation: {}\n\n\
             Key Paths: {listed}",
            project.code_files.len(),
            project.config_files.len(),
            project.documentation.len(),
        ));
    }

    lines.join("\n\n")
}

/// Sections of the given types as `## Title` blocks, or `None` when absent.
fn body_of(model: &DocumentModel, types: &[SectionType]) -> Option<String> {
    let blocks: Vec<String> = model
        .sections
        .iter()
        .filter(|s| types.contains(&s.section_type))
        .map(render_section)
        .collect();
    (!blocks.is_empty()).then(|| blocks.join("\n\n"))
}

fn render_section(section: &Section) -> String {
    format!("## {}\n{}", section.title, section.content.trim())
}

fn task_block(model: &DocumentModel) -> String {
    let mut features: Vec<String> = Vec::new();
    for section in model.sections.iter().filter(|s| {
        matches!(
            s.section_type,
            SectionType::Requirements | SectionType::Implementation
        )
    }) {
        for caps in IMPLEMENT_TARGET.captures_iter(&section.content) {
            let feature = caps[1].to_string();
            if !features.contains(&feature) {
                features.push(feature);
            }
        }
    }
    features.truncate(MAX_TASK_FEATURES);

    let target = if features.is_empty() {
        "the specified functionality".to_string()
    } else {
        features.join(", ")
    };

    format!(
        "Based on the provided design document, implement {target}.\n\n\
         Your implementation should:\n\
         1. Follow the technical specifications and requirements outlined above\n\
         2. Adhere to the coding style and conventions of the existing project\n\
         3. Include comprehensive error handling and logging\n\
         4. Provide clear documentation and comments\n\
         5. Respect the domain constraints and performance requirements"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::pipeline::structuring::{DocumentStats, EntityMap};

    fn section(title: &str, content: &str, section_type: SectionType) -> Section {
        Section {
            title: title.into(),
            content: content.into(),
            section_type,
            confidence: 0.8,
            entities: BTreeSet::new(),
        }
    }

    fn model(sections: Vec<Section>) -> DocumentModel {
        let mut entities = EntityMap::new();
        entities.insert("network_functions".into(), vec!["AMF".into()]);
        DocumentModel {
            stats: DocumentStats {
                length: 0,
                section_count: sections.len(),
                entity_count: 1,
            },
            sections,
            entities,
        }
    }

    #[test]
    fn headings_in_fixed_order() {
        let prompt = MarkdownPromptAssembler.assemble(&model(vec![]), &ProjectContext::default());
        let positions: Vec<usize> = ["# Context", "# Requirements", "# Constraints", "# Task"]
            .iter()
            .map(|h| prompt.find(h).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn sections_placed_by_type() {
        let m = model(vec![
            section("Overview", "The gateway terminates N2.", SectionType::SystemOverview),
            section("Functional", "Implement registration and implement paging.", SectionType::Requirements),
            section("Security", "TLS everywhere.", SectionType::Security),
        ]);
        let prompt = MarkdownPromptAssembler.assemble(&m, &ProjectContext::default());

        let requirements = prompt.find("# Requirements").unwrap();
        let constraints = prompt.find("# Constraints").unwrap();
        assert!(prompt.find("## Overview").unwrap() < requirements);
        assert!(prompt.find("## Functional").unwrap() < constraints);
        assert!(prompt.find("## Security").unwrap() > constraints);
        assert!(prompt.contains("- network_functions: AMF"));
        assert!(prompt.contains("implement registration, paging."));
    }

    #[test]
    fn generic_task_without_features() {
        let prompt = MarkdownPromptAssembler.assemble(&model(vec![]), &ProjectContext::default());
        assert!(prompt.contains("implement the specified functionality."));
        assert!(prompt.contains("No existing project structure to analyze."));
    }

    #[test]
    fn project_listing_summarized() {
        let project = ProjectContext::from_listing(["src/main.rs", "Cargo.toml", "README.md"]);
        let prompt = MarkdownPromptAssembler.assemble(&model(vec![]), &project);
        assert!(prompt.contains("- Code Files: 1"));
        assert!(prompt.contains("- Configuration Files: 1"));
        assert!(prompt.contains("Key Paths: src/main.rs, Cargo.toml, README.md"));
    }
}
