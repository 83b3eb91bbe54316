// Resume structuring prompt templates.

pub const RESUME_PARSE_SYSTEM: &str = "\
You are an expert resume parser. Extract a clean JSON object with these keys: \
full_name, email, phone, location, links (array of strings), skills (array of strings), \
education (array of {institution, degree, start_date, end_date}), \
experience (array of {company, role, start_date, end_date, summary}). \
Use null for unknown scalar fields and [] for unknown lists. \
Return ONLY valid JSON with no comments or markdown.";

pub const RESUME_PARSE_PROMPT: &str = r#"Below is the resume text extracted from a PDF. Extract a clean JSON object following the specified schema. Return ONLY valid JSON with no comments or markdown.

RESUME_TEXT:
{resume_text}"#;

/// Fixed sample used by the LLM health check.
pub const HEALTH_SAMPLE_RESUME: &str = "John Doe, email john@example.com, phone +1 234 567 8901, \
San Francisco, github.com/johndoe, skills: Python, Rust";
