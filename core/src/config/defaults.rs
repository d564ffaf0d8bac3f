//! The built-in supervisor and worker roster. These values are explicit data
//! passed into the resolver, never read back from ambient process state.

use super::{AgentConfig, AssemblyConfig, SupervisorConfig};

pub const SUPERVISOR_NAME: &str = "supervisor";
pub const FINANCE_AGENT: &str = "finance_research_agent";
pub const RESEARCH_AGENT: &str = "general_research_agent";
pub const WRITING_AGENT: &str = "writing_agent";

const DEFAULT_MODEL: &str = "openai/gpt-4.1";
const GENERIC_WORKER_MODEL: &str = "anthropic/claude-3-5-sonnet-latest";

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn supervisor_prompt() -> String {
    format!(
        "today's date is {}

You are the Executive Content Director orchestrating a team of specialized AI \
agents to produce exceptional content for clients.

Your workflow:
1. Analyze the user's request to understand what type of content they need
2. Route to appropriate research agents to gather information
3. Once you have sufficient research, route to the writing agent to create the final content
4. When the task is complete, respond with the final content and stop routing

Always be strategic about which agents to use and in what order to produce \
the best possible content.",
        today()
    )
}

fn finance_prompt() -> String {
    format!(
        "today's date is {}, You are an expert finance research assistant for a \
digital content agency. You have access to the following tools: \
finance_research, basic_research, and get_todays_date. First get today's date \
then continue. The finance_research tool searches financial data and news from \
Yahoo Finance. The basic_research tool searches for general information. When \
you are done with your research, return the research to the supervisor agent.",
        today()
    )
}

fn research_prompt() -> String {
    format!(
        "today's date is {}, You are an expert general research agent. You have \
access to the following tools: advanced_research and get_todays_date. First \
get today's date, then use the advanced_research tool to search for \
information on the topic you are given. When you are done, return the research \
to the supervisor agent.",
        today()
    )
}

const WRITING_PROMPT: &str = "You are an expert writing assistant. Your primary \
responsibility is to help draft, edit, and improve written content to ensure \
clarity, correctness, and engagement. Take the content you are given, write \
the final content in the format the user requested, then return it to the \
supervisor agent.";

/// The default assembly: the supervisor plus the finance, research and
/// writing workers.
pub fn default_assembly() -> AssemblyConfig {
    AssemblyConfig {
        supervisor: SupervisorConfig {
            name: SUPERVISOR_NAME.to_string(),
            system_prompt: supervisor_prompt(),
            model: DEFAULT_MODEL.to_string(),
        },
        workers: vec![
            AgentConfig {
                name: FINANCE_AGENT.to_string(),
                description: "Specialized in financial data research and analysis \
using Yahoo Finance and other financial sources"
                    .to_string(),
                system_prompt: finance_prompt(),
                model: DEFAULT_MODEL.to_string(),
                selected_tools: vec![
                    "finance_research".to_string(),
                    "basic_research".to_string(),
                    "get_todays_date".to_string(),
                ],
            },
            AgentConfig {
                name: RESEARCH_AGENT.to_string(),
                description: "Expert at comprehensive web research on any topic \
using advanced search tools"
                    .to_string(),
                system_prompt: research_prompt(),
                model: DEFAULT_MODEL.to_string(),
                selected_tools: vec![
                    "advanced_research".to_string(),
                    "get_todays_date".to_string(),
                ],
            },
            AgentConfig {
                name: WRITING_AGENT.to_string(),
                description: "Professional content writer that creates final \
polished content in any format"
                    .to_string(),
                system_prompt: WRITING_PROMPT.to_string(),
                model: DEFAULT_MODEL.to_string(),
                selected_tools: vec![
                    "advanced_research".to_string(),
                    "get_todays_date".to_string(),
                ],
            },
        ],
    }
}

/// Generic defaults for a worker that has no role-specific entry in the
/// default roster.
pub fn default_worker(name: &str) -> AgentConfig {
    AgentConfig {
        name: name.to_string(),
        description: format!("General-purpose assistant agent '{name}'"),
        system_prompt: "You are a helpful AI assistant.".to_string(),
        model: GENERIC_WORKER_MODEL.to_string(),
        selected_tools: vec!["get_todays_date".to_string()],
    }
}
