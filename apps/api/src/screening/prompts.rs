// All LLM prompt constants for the Screening module.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt for resume analysis — pins the reply to one JSON object
/// with a fixed key set.
pub const RESUME_ANALYSIS_SYSTEM: &str = "You are an expert HR analyst that only responds \
    with valid JSON containing exactly the keys: name, email, score, and summary.";

/// Resume analysis prompt template.
/// Replace `{job_description}` and `{resume_text}` before sending.
pub const RESUME_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following resume based on the provided job description.
Extract the candidate's name and email.
Score the candidate from 0 to 100 on how well they fit the job description.
Provide a brief summary (2-3 sentences) of their qualifications and why they are a good fit.

Return the result as a single, valid JSON object with exactly the keys: "name", "email", "score", and "summary".

Job Description:
---
{job_description}
---

Resume:
---
{resume_text}
---

JSON Output:"#;
