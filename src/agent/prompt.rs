use std::fmt;
use std::str::FromStr;

const DEFAULT_ANALYZER_INSTRUCTIONS: &str = "Analise os dados e forneça insights.";
const DEFAULT_GENERATOR_INSTRUCTIONS: &str = "Gere conteúdo sobre o tópico.";

/// The `agentType` values an agent node may declare. Each one frames the
/// upstream output differently when building the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Chatbot,
    Analyzer,
    Generator,
    LangchainAgent,
}

impl FromStr for AgentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chatbot" => Ok(AgentKind::Chatbot),
            "analyzer" => Ok(AgentKind::Analyzer),
            "generator" => Ok(AgentKind::Generator),
            "langchain_agent" => Ok(AgentKind::LangchainAgent),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentKind::Chatbot => "chatbot",
            AgentKind::Analyzer => "analyzer",
            AgentKind::Generator => "generator",
            AgentKind::LangchainAgent => "langchain_agent",
        };
        write!(f, "{}", name)
    }
}

impl AgentKind {
    /// Assembles the prompt sent to the runner from the node instructions and the
    /// output of the previous node.
    pub fn build_prompt(&self, instructions: &str, input: &str) -> String {
        let instructions = instructions.trim();
        match self {
            AgentKind::Chatbot if instructions.is_empty() => input.to_string(),
            AgentKind::Chatbot => format!("{}\n\nMensagem: {}", instructions, input),
            AgentKind::Analyzer => format!(
                "{}\nDados: {}",
                non_empty_or(instructions, DEFAULT_ANALYZER_INSTRUCTIONS),
                input
            ),
            AgentKind::Generator => format!(
                "{}\nTópico: {}",
                non_empty_or(instructions, DEFAULT_GENERATOR_INSTRUCTIONS),
                input
            ),
            AgentKind::LangchainAgent if instructions.is_empty() => input.to_string(),
            AgentKind::LangchainAgent => format!("{}\nConsulta: {}", instructions, input),
        }
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agent_kinds() {
        assert_eq!("chatbot".parse::<AgentKind>(), Ok(AgentKind::Chatbot));
        assert_eq!("langchain_agent".parse::<AgentKind>(), Ok(AgentKind::LangchainAgent));
        assert!("Chatbot".parse::<AgentKind>().is_err());
    }

    #[test]
    fn test_prompt_templates() {
        assert_eq!(AgentKind::Chatbot.build_prompt("", "oi"), "oi");
        assert_eq!(
            AgentKind::Chatbot.build_prompt("Seja breve.", "oi"),
            "Seja breve.\n\nMensagem: oi"
        );
        assert_eq!(
            AgentKind::Analyzer.build_prompt("  ", "1,2,3"),
            "Analise os dados e forneça insights.\nDados: 1,2,3"
        );
        assert_eq!(
            AgentKind::Generator.build_prompt("Escreva um poema.", "mar"),
            "Escreva um poema.\nTópico: mar"
        );
        assert_eq!(
            AgentKind::LangchainAgent.build_prompt("Use as ferramentas.", "clima"),
            "Use as ferramentas.\nConsulta: clima"
        );
    }
}
