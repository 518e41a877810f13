//! Prompt templates for the language-model calls

use crate::domain::Aspect;
use crate::error::{Result, SolaceError};
use std::fs;
use std::path::Path;

/// Placeholder filled with one entry field in aspect templates
pub const ENTRY_PLACEHOLDER: &str = "{ENTRY}";
/// Placeholder filled with the collected aspect responses in the summary template
pub const RESPONSES_PLACEHOLDER: &str = "{RESPONSES}";

/// Template file name of the merge call
pub const SUMMARY_TEMPLATE_NAME: &str = "summary.txt";

// Built-in template constants
const GRATITUDE_TEMPLATE: &str = "The user wrote the following journal entry:
{ENTRY}

Your task: extract and highlight the POSITIVE aspects of this entry.
Focus on gratitude, small wins, or moments of hope.
Return a short and empathetic reflection.
";
const LISTENER_TEMPLATE: &str = "The user shared the following journal entry:
{ENTRY}

Your task: respond like an empathetic listener.
- Acknowledge the emotions expressed
- Avoid advice or solutions
- Validate their feelings in a compassionate tone
- Keep it short (2-3 sentences)
";
const PLANNER_TEMPLATE: &str = "The user shared the following journal entry:
{ENTRY}

Your task: act like a gentle planner.
- Create a supportive and realistic day plan
- Cover key tasks without making it overwhelming
- Keep it short (2-3 sentences)
- Ensure it promotes both productivity and mental well-being
";
const SAFETY_TEMPLATE: &str = "You are a safety checker for a mental wellness journal.
The user wrote:
{ENTRY}

Your task:
- Check if the entry shows signs of self-harm, suicidal ideation, violence, or extreme emotional distress.
- Respond ONLY with one of the following formats:

SAFE: [short explanation]
UNSAFE: [short explanation]
";
const SUMMARY_TEMPLATE: &str = "The following agents provided responses:
{RESPONSES}

Write a short, empathetic summary of the user's diary entry.
";

/// A prompt with exactly one placeholder
#[derive(Debug, Clone)]
pub struct Template {
    content: String,
    placeholder: &'static str,
}

impl Template {
    /// Create template from built-in template name
    pub fn from_builtin(template_name: &str) -> Result<Self> {
        let content = match template_name {
            "gratitude.txt" => GRATITUDE_TEMPLATE,
            "listener.txt" => LISTENER_TEMPLATE,
            "planner.txt" => PLANNER_TEMPLATE,
            "safety.txt" => SAFETY_TEMPLATE,
            SUMMARY_TEMPLATE_NAME => SUMMARY_TEMPLATE,
            _ => {
                return Err(SolaceError::Template(format!(
                    "Unknown template: {}",
                    template_name
                )))
            }
        };

        Ok(Template {
            content: content.to_string(),
            placeholder: placeholder_for(template_name),
        })
    }

    /// Create template from custom template file
    pub fn from_file(path: &Path, template_name: &str) -> Result<Self> {
        // Reject names we have no built-in for before touching the file
        Template::from_builtin(template_name)?;

        let content = fs::read_to_string(path)
            .map_err(|e| SolaceError::Template(format!("Failed to read template file: {}", e)))?;

        let placeholder = placeholder_for(template_name);
        if !content.contains(placeholder) {
            return Err(SolaceError::Template(format!(
                "Custom template {} must contain {}",
                path.display(),
                placeholder
            )));
        }

        Ok(Template {
            content,
            placeholder,
        })
    }

    /// Fill the placeholder with one caller-supplied value
    pub fn render(&self, value: &str) -> String {
        self.content.replace(self.placeholder, value)
    }
}

fn placeholder_for(template_name: &str) -> &'static str {
    if template_name == SUMMARY_TEMPLATE_NAME {
        RESPONSES_PLACEHOLDER
    } else {
        ENTRY_PLACEHOLDER
    }
}

/// Load template from custom location or fall back to built-in
pub fn load_template(prompts_dir: &Path, template_name: &str) -> Result<Template> {
    let custom_path = prompts_dir.join(template_name);

    if custom_path.exists() {
        Template::from_file(&custom_path, template_name)
    } else {
        Template::from_builtin(template_name)
    }
}

/// The five templates used by one dispatcher
#[derive(Debug, Clone)]
pub struct PromptSet {
    gratitude: Template,
    reflection: Template,
    plan: Template,
    safety: Template,
    summary: Template,
}

impl PromptSet {
    /// Built-in prompts only
    pub fn builtin() -> Result<Self> {
        Ok(PromptSet {
            gratitude: Template::from_builtin(Aspect::Gratitude.template_name())?,
            reflection: Template::from_builtin(Aspect::Reflection.template_name())?,
            plan: Template::from_builtin(Aspect::Plan.template_name())?,
            safety: Template::from_builtin(Aspect::Safety.template_name())?,
            summary: Template::from_builtin(SUMMARY_TEMPLATE_NAME)?,
        })
    }

    /// Prompts from `prompts_dir`, falling back to built-ins per file
    pub fn load(prompts_dir: &Path) -> Result<Self> {
        Ok(PromptSet {
            gratitude: load_template(prompts_dir, Aspect::Gratitude.template_name())?,
            reflection: load_template(prompts_dir, Aspect::Reflection.template_name())?,
            plan: load_template(prompts_dir, Aspect::Plan.template_name())?,
            safety: load_template(prompts_dir, Aspect::Safety.template_name())?,
            summary: load_template(prompts_dir, SUMMARY_TEMPLATE_NAME)?,
        })
    }

    /// Template of an aspect call
    pub fn aspect(&self, aspect: Aspect) -> &Template {
        match aspect {
            Aspect::Gratitude => &self.gratitude,
            Aspect::Reflection => &self.reflection,
            Aspect::Plan => &self.plan,
            Aspect::Safety => &self.safety,
        }
    }

    /// Template of the merge call
    pub fn summary(&self) -> &Template {
        &self.summary
    }
}
