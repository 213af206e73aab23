//! Topic templates used by the CLI to title generated tasks.

use crate::generate::TitleSource;
use crate::models::Goal;

struct Template {
    key: &'static str,
    foundation: [&'static str; 3],
    intermediate: [&'static str; 3],
    advanced: [&'static str; 3],
    project: &'static str,
}

const TEMPLATES: &[Template] = &[
    Template {
        key: "react",
        foundation: ["JSX Syntax", "Components Basics", "Props"],
        intermediate: ["State Management", "Hooks (useState, useEffect)", "Event Handling"],
        advanced: ["Context API", "Custom Hooks", "Performance Optimization"],
        project: "Mini Project",
    },
    Template {
        key: "python",
        foundation: ["Syntax & Variables", "Data Types", "Control Flow"],
        intermediate: ["Functions", "OOP Basics", "File Handling"],
        advanced: ["Decorators", "Generators", "Async Programming"],
        project: "CLI Application",
    },
    Template {
        key: "javascript",
        foundation: ["Variables & Types", "Functions", "Arrays & Objects"],
        intermediate: ["DOM Manipulation", "Async/Await", "Promises"],
        advanced: ["Closures", "Prototypes", "ES6+ Features"],
        project: "Interactive Web App",
    },
    Template {
        key: "data_structures",
        foundation: ["Arrays", "Linked Lists", "Stacks & Queues"],
        intermediate: ["Trees", "Hash Tables", "Graphs"],
        advanced: ["Advanced Trees", "Dynamic Programming", "Algorithm Analysis"],
        project: "Algorithm Implementation",
    },
];

const DEFAULT_TEMPLATE: Template = Template {
    key: "default",
    foundation: ["Introduction & Setup", "Basic Concepts", "Core Fundamentals"],
    intermediate: ["Intermediate Topics", "Practical Applications", "Best Practices"],
    advanced: ["Advanced Concepts", "Optimization Techniques", "Real-world Scenarios"],
    project: "Capstone Project",
};

const PRACTICE: &str = "Practice & Review";
const FINAL_REVIEW: &str = "Final Review";

/// Titles drawn from a topic template picked by keyword in the goal title.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateTitles;

impl TemplateTitles {
    /// Template key matching `goal_title`, or `"default"`.
    pub fn detect_topic(goal_title: &str) -> &'static str {
        Self::template_for(goal_title).key
    }

    fn template_for(goal_title: &str) -> &'static Template {
        let normalized = goal_title.to_lowercase().replace([' ', '-'], "_");
        TEMPLATES
            .iter()
            .find(|t| normalized.contains(t.key))
            .unwrap_or(&DEFAULT_TEMPLATE)
    }
}

impl TitleSource for TemplateTitles {
    /// Exactly `count` titles: the template in curriculum order, padded with
    /// practice sessions and a trailing final review, or truncated.
    fn titles(&self, goal: &Goal, count: usize) -> Vec<String> {
        let template = Self::template_for(&goal.title);
        let mut titles: Vec<String> = template
            .foundation
            .iter()
            .chain(template.intermediate.iter())
            .chain(template.advanced.iter())
            .chain(std::iter::once(&template.project))
            .map(|s| s.to_string())
            .collect();

        titles.truncate(count);
        while titles.len() < count {
            let filler = if titles.len() + 1 < count {
                PRACTICE
            } else {
                FINAL_REVIEW
            };
            titles.push(filler.to_string());
        }
        titles
    }
}
