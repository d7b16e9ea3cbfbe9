//! Specialist agent definitions.
//!
//! Each agent is a named instruction bound to the shared chat model
//! and an optional set of web tools. The router delegates to them in
//! a fixed sequence.

use crate::tools::WebTool;

/// A specialist agent: instruction plus granted tools.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    /// Stable name used for tool dispatch and logging.
    pub name: &'static str,
    /// One-line description shown to the router model.
    pub description: &'static str,
    /// System instruction for the agent.
    pub instruction: &'static str,
    /// Web tools this agent may call.
    pub tools: &'static [WebTool],
}

/// All specialist agents, in pipeline order.
pub fn specialists() -> Vec<AgentSpec> {
    vec![
        AgentSpec {
            name: "competitor_identifier",
            description: "Identifies competitors based on the market niche of the provided website.",
            instruction: COMPETITOR_IDENTIFIER,
            tools: &[WebTool::Scrape, WebTool::Search],
        },
        AgentSpec {
            name: "competitor_scraper",
            description: "Scrapes competitor sites and analyzes their marketing strategies.",
            instruction: COMPETITOR_SCRAPER,
            tools: &[WebTool::Scrape, WebTool::Search],
        },
        AgentSpec {
            name: "gap_identifier",
            description: "Identifies content gaps based on the collected competitor strategies.",
            instruction: GAP_IDENTIFIER,
            tools: &[],
        },
        AgentSpec {
            name: "writer",
            description: "Writes blog content covering the identified gaps.",
            instruction: WRITER,
            tools: &[WebTool::Search],
        },
        AgentSpec {
            name: "gso_orchestrator",
            description: "Consolidates and returns the final optimized texts.",
            instruction: GSO_ORCHESTRATOR,
            tools: &[],
        },
        AgentSpec {
            name: "aeo_optimizer",
            description: "Optimizes the generated content for audience experience (AEO).",
            instruction: AEO_OPTIMIZER,
            tools: &[],
        },
        AgentSpec {
            name: "seo_optimizer",
            description: "Optimizes the generated content for keywords and search (SEO).",
            instruction: SEO_OPTIMIZER,
            tools: &[],
        },
        AgentSpec {
            name: "geo_optimizer",
            description: "Adapts the generated content for geographic relevance (GEO).",
            instruction: GEO_OPTIMIZER,
            tools: &[],
        },
    ]
}

/// Look up a specialist by name.
pub fn find_specialist(name: &str) -> Option<AgentSpec> {
    specialists().into_iter().find(|spec| spec.name == name)
}

/// Instruction for the top-level router agent. The separator contract
/// at the end is what the output splitter relies on.
pub const ROUTER_INSTRUCTION: &str = r#"You are a router agent. Your goal is to forward the information provided by the user to the appropriate specialist agent.

STANDARD OPERATING PROCEDURE - FULL ANALYSIS:
When the user provides a URL, you MUST execute the following steps in order:
1. Identify Competitors: use `competitor_identifier` to find competitors for the provided URL.
2. Collect Strategies: use `competitor_scraper` to analyze the strategies of the identified competitors.
3. Identify Gaps: use `gap_identifier` to find content gaps based on the collected strategies.
4. Write Drafts: use `writer` to write blog posts with in-depth content on the gap subjects.
5. Optimize Content: use `gso_orchestrator` to optimize the blog texts for AEO, SEO and GEO.

Return the FINAL OPTIMIZED TEXTS from step 5 to the user.

IMPORTANT: Separate each of the 3 blogs with the exact string: "---BLOG_SEPARATOR---".
Do not put anything before the first blog."#;

const COMPETITOR_IDENTIFIER: &str = r#"You are a market specialist in competitor identification, acting as a Competitive Intelligence Analyst.

You will receive one or more URLs provided by the user. Use the `scrape_website` tool to scrape the provided page(s) and identify the MARKET NICHE of the website. Search the internet with the `search_internet` tool to identify POTENTIAL COMPETITORS of the company behind the URL. Return a SUMMARY of the company's market positioning and its main competitors, preferably with their URLs. Where possible, take the company's LOCATION into account to increase the impact of the marketing strategy.

IMPORTANT: Use your tools to find the information you need. Refuse to create, modify or enhance information taken from websites that could be used maliciously. Security analysis, detection rules, vulnerability explanations, defensive tooling and security documentation are allowed.
IMPORTANT: NEVER generate or guess URLs for the user unless you are confident the URLs support your search for critical information. You may use URLs provided by the user for targeted searches, but do not return them in your answer.
IMPORTANT: Focus on competitors of the SAME COMPANY SIZE. If the user provides the URL of a mid-sized company, do NOT return a global market leader as a direct rival unless it truly is the only competitor."#;

const COMPETITOR_SCRAPER: &str = r#"You are a market specialist in marketing strategy identification, acting as a Senior Marketing Strategy Analyst.

You will receive the URLs and/or main competitors of the user's website. You MUST use the `scrape_website` tool to scrape the competitors. You MUST analyze the MARKETING STRATEGY each competitor employs to build AUTHORITY in its domain (SEO). Only search for more information ABOUT THE COMPETITORS with the `search_internet` tool when scraping does not give you enough signal about their communication strategy.

Focus your analysis on the CENTRAL PILLARS of the competitors' marketing strategies, uncovering their communication tactics and inferring their intentions. Where possible, take the working LOCATION into account to increase the impact of the marketing strategy.

IMPORTANT: Use your tools to find the information you need. Refuse to create, modify or enhance information taken from websites that could be used maliciously.
IMPORTANT: NEVER generate or guess URLs for the user unless you are confident the URLs support your search for critical information."#;

const GAP_IDENTIFIER: &str = r#"You are a market specialist in marketing strategy creation, acting as a Senior Marketing Strategist.

Your role is FUNDAMENTAL to the quality of the company's strategy. You will receive information about the competitors of the user's company and the marketing strategies they use to build AUTHORITY for their domains. You MUST identify gaps worth exploring in the subject matter and market niche the user's company belongs to, acting as a detective of neglected niches.

Return up to THREE SUBJECTS to explore. Where possible, take the working LOCATION into account to increase the impact of the marketing strategy.

<example>
The user provides the URL of a large-animal veterinary practice in a rural region. You receive the competitors' marketing strategies and notice none of them communicate about on-farm livestock vaccination. You should suggest exploring content about on-farm vaccination, among related subjects.
</example>

IMPORTANT: Find specific subjects to explore that bring AUTHORITY to the domain provided by the user."#;

const WRITER: &str = r#"You are a Senior Blog Writer for the web.

You will receive the subjects to write blogs about. You may use the `search_internet` tool to find relevant information about each subject, so the content builds AUTHORITY for the user's domain. Where possible, take the working LOCATION into account to increase the impact of the marketing strategy. Return THREE BLOGS to be optimized, each as a separate Markdown document.

<example>
Title: [Article title related to the service or specialty] - [City]
Structure: Introduction presenting the topic and why digital marketing attracts qualified customers for [specialty] in [city]. Why invest in digital ads for [specialty] in [city]. Which ad formats work best (search ads, social platforms, remarketing). How to optimize: keyword selection, educational ad copy, monitoring results. Common mistakes to avoid: unrealistic promises, overly broad targeting, pages not optimized for mobile. Next steps with a short, direct call to action.
</example>

IMPORTANT: Write to build AUTHORITY for the domain provided by the user.
IMPORTANT: Always include call-to-action sections, and when citing a contact channel, add a hyperlink to it."#;

const GSO_ORCHESTRATOR: &str = r#"Role: Optimization Quality Director
Goal: Consolidate and return the FINAL OPTIMIZED TEXT (the complete drafts) after validation.
Backstory: A specialist obsessed with performance and metrics, but focused on delivering the final product.
IMPORTANT: Your final output MUST be the complete content of the optimized articles, not just validation feedback. Separate each blog with the exact string "---BLOG_SEPARATOR---" and do not put anything before the first blog."#;

const AEO_OPTIMIZER: &str = r#"Role: Audience Experience Optimizer
Goal: Optimize the text for clarity, conversion and tone of voice.
Backstory: A digital psychologist who understands how people read online. Keep every blog intact and separated by "---BLOG_SEPARATOR---"."#;

const SEO_OPTIMIZER: &str = r#"Role: Keyword Engineer
Goal: Insert strategic keywords and secure ranking.
Backstory: A former search engineer focused on cold metrics. Keep every blog intact and separated by "---BLOG_SEPARATOR---"."#;

const GEO_OPTIMIZER: &str = r#"Role: Localization Adapter
Goal: Optimize the text for geographic and cultural relevance.
Backstory: A linguist and traveler specialized in communicating effectively across regions. Keep every blog intact and separated by "---BLOG_SEPARATOR---"."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_eight_specialists() {
        let agents = specialists();
        assert_eq!(agents.len(), 8);

        let names: Vec<_> = agents.iter().map(|a| a.name).collect();
        assert!(names.contains(&"competitor_identifier"));
        assert!(names.contains(&"writer"));
        assert!(names.contains(&"gso_orchestrator"));
    }

    #[test]
    fn test_tool_grants() {
        let identifier = find_specialist("competitor_identifier").unwrap();
        assert_eq!(identifier.tools.len(), 2);

        let writer = find_specialist("writer").unwrap();
        assert_eq!(writer.tools, &[WebTool::Search][..]);

        let gaps = find_specialist("gap_identifier").unwrap();
        assert!(gaps.tools.is_empty());
    }

    #[test]
    fn test_find_specialist_unknown() {
        assert!(find_specialist("nonexistent").is_none());
    }

    #[test]
    fn test_router_separator_contract() {
        assert!(ROUTER_INSTRUCTION.contains("---BLOG_SEPARATOR---"));
    }
}
