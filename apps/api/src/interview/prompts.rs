// All LLM prompt constants for the interview module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::interview::category::Category;
use crate::interview::session::AnswerModality;
use crate::llm_client::prompts::excerpt;
use crate::models::InterviewContext;

/// Max characters of resume / job description folded into a question prompt.
const MAX_CONTEXT_CHARS: usize = 4000;

const TECHNICAL_TEMPLATES: [&str; 5] = [
    "Generate a coding interview question about data structures and algorithms. Focus on arrays, linked lists, trees, or graphs.",
    "Create a system design question about building a scalable web application or distributed system.",
    "Ask about database design, optimization, or SQL query problems commonly seen in technical interviews.",
    "Generate a question about object-oriented programming concepts, design patterns, or software architecture.",
    "Create a problem-solving question involving time/space complexity analysis and optimization.",
];

const BEHAVIORAL_TEMPLATES: [&str; 5] = [
    "Generate a behavioral question about handling conflict or difficult team situations using the STAR method.",
    "Ask about a time when someone had to show leadership, take initiative, or influence others without authority.",
    "Create a question about overcoming challenges, learning from failure, or adapting to change.",
    "Generate a question about collaboration, teamwork, or working with diverse groups of people.",
    "Ask about prioritization, time management, or handling competing deadlines and pressures.",
];

const SYSTEM_DESIGN_TEMPLATES: [&str; 5] = [
    "Design a social media platform like Twitter or Instagram, focusing on scalability and real-time features.",
    "Create a system design for an e-commerce platform, covering payments, inventory, and recommendations.",
    "Design a messaging system like WhatsApp or Slack, including real-time communication and file sharing.",
    "Ask about designing a video streaming service like Netflix or YouTube with global distribution.",
    "Generate a question about designing a ride-sharing app like Uber, including matching algorithms and real-time tracking.",
];

const LEADERSHIP_TEMPLATES: [&str; 5] = [
    "Ask about a time when someone had to make a difficult decision that affected their team or organization.",
    "Generate a question about building and motivating a team, including hiring and performance management.",
    "Create a scenario about managing organizational change, transformation, or strategic initiatives.",
    "Ask about handling underperformance, giving difficult feedback, or having crucial conversations.",
    "Generate a question about vision setting, goal alignment, and driving results through others.",
];

const PRODUCT_TEMPLATES: [&str; 5] = [
    "Ask about prioritizing features for a product roadmap with limited resources and competing stakeholder needs.",
    "Generate a question about analyzing user feedback, metrics, and data to make product decisions.",
    "Create a scenario about launching a new product feature, including go-to-market strategy and success metrics.",
    "Ask about competitive analysis and positioning a product in a crowded market.",
    "Generate a question about working with engineering teams to balance technical debt and feature development.",
];

/// Question requirements appended to every base template.
/// Replace: {question_number}
const QUESTION_REQUIREMENTS_TEMPLATE: &str = r#"Requirements for Question #{question_number}:
- Make it specific, realistic, and different from typical interview questions
- Suitable for mid to senior level positions
- Should take 3-5 minutes to answer properly
- Include context or scenario if needed
- Ensure this question is unique and varied from previous questions
- Add specific details that make it engaging and memorable

Return only the question, no additional text or formatting."#;

/// Personalization block. Replace: {resume}, {job_description}
const CONTEXT_TEMPLATE: &str = r#"CANDIDATE CONTEXT (use it to tailor the scenario, technologies and seniority of the question; do NOT quote it back):

Candidate resume:
{resume}

Target job description:
{job_description}"#;

/// Answer evaluation prompt.
/// Replace: {question}, {answer_block}, {category}, {modality_criteria}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"You are an expert interviewer evaluating a candidate's response.

Question: "{question}"
{answer_block}
Category: {category}

Please evaluate this answer and provide structured feedback in the following JSON format:

{
  "score": [integer from 1-10],
  "overall": "[Excellent/Good/Average/Poor/Needs Improvement]",
  "strengths": "[What the candidate did well - be specific and encouraging]",
  "improvements": "[Areas that need work - be constructive and specific]",
  "suggestions": "[Actionable advice for improvement - include examples or techniques]"
}

Evaluation criteria:
{modality_criteria}

Be constructive, encouraging, and specific in your feedback. Help the candidate improve while acknowledging their strengths.

Return only the JSON object, no additional text."#;

const SPOKEN_CRITERIA: &str = "\
- Technical accuracy (if applicable)
- Structure and clarity of response
- Depth of understanding
- Communication skills
- Relevance to the question
- Use of examples/specifics
- Problem-solving approach";

const CODE_CRITERIA: &str = "\
- Correctness of the solution, including edge cases
- Time and space complexity, and whether it is optimal
- Code readability, naming and structure
- Idiomatic use of the chosen language
- Relevance to the question
- Problem-solving approach";

/// Ordered base templates for a category.
pub fn question_templates(category: Category) -> &'static [&'static str] {
    match category {
        Category::Technical => &TECHNICAL_TEMPLATES,
        Category::Behavioral => &BEHAVIORAL_TEMPLATES,
        Category::SystemDesign => &SYSTEM_DESIGN_TEMPLATES,
        Category::Leadership => &LEADERSHIP_TEMPLATES,
        Category::Product => &PRODUCT_TEMPLATES,
    }
}

/// Picks the base template for a 1-based question number, cycling through the list.
pub fn base_template(category: Category, question_number: u32) -> &'static str {
    let templates = question_templates(category);
    let index = (question_number.max(1) - 1) as usize % templates.len();
    templates[index]
}

/// Substitutes `{key}` placeholders in a single left-to-right pass.
/// Inserted values are never rescanned, so braces in user or model text stay literal.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = values
            .iter()
            .find(|(key, _)| tail.starts_with(key) && tail[key.len()..].starts_with('}'));
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Builds the full question-generation prompt.
pub fn build_question_prompt(
    category: Category,
    question_number: u32,
    context: &InterviewContext,
) -> String {
    let mut prompt = format!(
        "{}\n\n{}",
        base_template(category, question_number),
        fill_template(
            QUESTION_REQUIREMENTS_TEMPLATE,
            &[("question_number", question_number.to_string().as_str())]
        )
    );

    if !context.is_empty() {
        let resume = context
            .resume_text
            .as_deref()
            .map(|r| excerpt(r, MAX_CONTEXT_CHARS))
            .unwrap_or_else(|| "(not provided)".to_string());
        let job_description = context
            .job_description
            .as_deref()
            .map(|j| excerpt(j, MAX_CONTEXT_CHARS))
            .unwrap_or_else(|| "(not provided)".to_string());
        prompt.push_str("\n\n");
        prompt.push_str(&fill_template(
            CONTEXT_TEMPLATE,
            &[
                ("resume", resume.as_str()),
                ("job_description", job_description.as_str()),
            ],
        ));
    }

    prompt
}

/// Builds the evaluation prompt for an answer in the given modality.
pub fn build_evaluation_prompt(
    question: &str,
    answer: &str,
    category: Category,
    modality: &AnswerModality,
) -> String {
    let (answer_block, criteria) = match modality {
        AnswerModality::Text | AnswerModality::Voice => {
            (format!("Answer: \"{answer}\""), SPOKEN_CRITERIA)
        }
        AnswerModality::Code { language } => (
            format!("Answer (code solution in {language}):\n```{language}\n{answer}\n```"),
            CODE_CRITERIA,
        ),
    };

    fill_template(
        EVALUATION_PROMPT_TEMPLATE,
        &[
            ("question", question),
            ("answer_block", answer_block.as_str()),
            ("category", category.label()),
            ("modality_criteria", criteria),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_five_templates() {
        for category in Category::ALL {
            assert_eq!(question_templates(category).len(), 5);
        }
    }

    #[test]
    fn test_template_selection_cycles_with_wraparound() {
        let templates = question_templates(Category::Behavioral);
        assert_eq!(base_template(Category::Behavioral, 1), templates[0]);
        assert_eq!(base_template(Category::Behavioral, 5), templates[4]);
        assert_eq!(base_template(Category::Behavioral, 6), templates[0]);
        assert_eq!(base_template(Category::Behavioral, 12), templates[1]);
    }

    #[test]
    fn test_question_prompt_numbers_the_question() {
        let prompt = build_question_prompt(Category::Product, 3, &InterviewContext::default());
        assert!(prompt.starts_with(PRODUCT_TEMPLATES[2]));
        assert!(prompt.contains("Requirements for Question #3:"));
        assert!(!prompt.contains("CANDIDATE CONTEXT"));
    }

    #[test]
    fn test_question_prompt_folds_in_context() {
        let context = InterviewContext::new(
            Some("Led the payments team at Acme".to_string()),
            None,
        );
        let prompt = build_question_prompt(Category::Leadership, 1, &context);
        assert!(prompt.contains("CANDIDATE CONTEXT"));
        assert!(prompt.contains("Led the payments team at Acme"));
        assert!(prompt.contains("Target job description:\n(not provided)"));
    }

    #[test]
    fn test_question_prompt_truncates_long_context() {
        let context = InterviewContext::new(None, Some("x".repeat(MAX_CONTEXT_CHARS + 500)));
        let prompt = build_question_prompt(Category::Technical, 1, &context);
        assert!(prompt.contains("[...truncated]"));
        assert!(!prompt.contains(&"x".repeat(MAX_CONTEXT_CHARS + 1)));
    }

    #[test]
    fn test_evaluation_prompt_for_spoken_answer() {
        let prompt = build_evaluation_prompt(
            "Tell me about a conflict.",
            "I mediated between two leads.",
            Category::Behavioral,
            &AnswerModality::Voice,
        );
        assert!(prompt.contains("Question: \"Tell me about a conflict.\""));
        assert!(prompt.contains("Answer: \"I mediated between two leads.\""));
        assert!(prompt.contains("Category: Behavioral Interview"));
        assert!(prompt.contains("Communication skills"));
    }

    #[test]
    fn test_fill_template_leaves_unknown_braces() {
        assert_eq!(
            fill_template("{a} {b} {{a}} {", &[("a", "1")]),
            "1 {b} {1} {"
        );
    }

    #[test]
    fn test_placeholders_inside_answers_are_not_expanded() {
        let prompt = build_evaluation_prompt(
            "Explain {category} routing and {answer_block} framing.",
            "Use {modality_criteria} and a map {\"k\": 1}",
            Category::Technical,
            &AnswerModality::Text,
        );
        assert!(prompt.contains("Question: \"Explain {category} routing and {answer_block} framing.\""));
        assert!(prompt.contains("Answer: \"Use {modality_criteria} and a map {\"k\": 1}\""));
        assert!(prompt.contains("Category: Technical Interview"));
        assert!(prompt.contains("\"score\": [integer from 1-10]"));
    }

    #[test]
    fn test_placeholders_inside_resume_are_not_expanded() {
        let context = InterviewContext::new(
            Some("Templating work: {job_description} and {resume}".to_string()),
            Some("Platform role".to_string()),
        );
        let prompt = build_question_prompt(Category::Technical, 2, &context);
        assert!(prompt.contains("Candidate resume:\nTemplating work: {job_description} and {resume}"));
        assert!(prompt.contains("Target job description:\nPlatform role"));
    }

    #[test]
    fn test_evaluation_prompt_fences_code_answers() {
        let prompt = build_evaluation_prompt(
            "Reverse a linked list.",
            "def solve(head): ...",
            Category::Technical,
            &AnswerModality::Code {
                language: "python".to_string(),
            },
        );
        assert!(prompt.contains("```python\ndef solve(head): ...\n```"));
        assert!(prompt.contains("Time and space complexity"));
        assert!(!prompt.contains("Communication skills"));
    }
}
