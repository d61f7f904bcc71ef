//! Prompt templates for the extraction and email models

use coldreach_schema::JobRecord;

use crate::config::SenderIdentity;

/// Ask the model for the posting's key fields as JSON
pub fn extraction_prompt(page_data: &str) -> String {
    format!(
        "### SCRAPED TEXT FROM WEBSITE:\n\
         {page_data}\n\
         ### INSTRUCTION:\n\
         Extract the job posting details and return them in JSON format with keys: \
         `role`, `experience`, `skills` (list of strings), and `description`. \
         Only return valid JSON.\n\
         ### VALID JSON (NO PREAMBLE):\n"
    )
}

/// Ask the model for a cold email pitching the sender's company
pub fn email_prompt(job: &JobRecord, links: &[String], identity: &SenderIdentity) -> String {
    let SenderIdentity {
        name,
        title,
        company,
        pitch,
    } = identity;
    let job_description = job.to_prompt_json();
    let link_list = render_links(links);

    format!(
        "### JOB DESCRIPTION:\n\
         {job_description}\n\n\
         ### INSTRUCTION:\n\
         You are {name}, {title} at {company}, {pitch}\n\
         Write a cold email to the client for the job above, highlighting {company}'s capabilities.\n\
         Include relevant portfolio links from: {link_list}\n\
         Remember your identity: {name}, {title} at {company}. Do not provide a preamble.\n\
         ### EMAIL (NO PREAMBLE):\n"
    )
}

fn render_links(links: &[String]) -> String {
    if links.is_empty() {
        return "(no portfolio links available)".to_string();
    }
    let quoted: Vec<String> = links.iter().map(|l| format!("'{l}'")).collect();
    format!("[{}]", quoted.join(", "))
}
