//! Best-effort splitter for the model's markdown range summaries. The
//! prompt asks for `## ` sections, but the model does not always comply,
//! so anything before the first heading lands in a default section.

/// One renderable block of the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: String,
}

const DEFAULT_TITLE: &str = "总结";

/// Splits markdown into `## ` sections. Top-level `# ` headings are
/// dropped; preamble text gets the default title.
pub fn parse_sections(content: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;

    for line in content.lines() {
        if line.starts_with("# ") && !line.starts_with("## ") {
            continue;
        }
        if let Some(title) = line.strip_prefix("## ") {
            if let Some(section) = current.take() {
                push_trimmed(&mut sections, section);
            }
            let title = title.trim();
            current = Some(Section {
                title: if title.is_empty() {
                    DEFAULT_TITLE.to_string()
                } else {
                    title.to_string()
                },
                body: String::new(),
            });
            continue;
        }

        let section = current.get_or_insert_with(|| Section {
            title: DEFAULT_TITLE.to_string(),
            body: String::new(),
        });
        if !section.body.is_empty() {
            section.body.push('\n');
        }
        section.body.push_str(line);
    }

    if let Some(section) = current {
        push_trimmed(&mut sections, section);
    }
    sections
}

fn push_trimmed(sections: &mut Vec<Section>, mut section: Section) {
    section.body = section.body.trim().to_string();
    if !section.body.is_empty() || !sections.is_empty() {
        sections.push(section);
    }
}
