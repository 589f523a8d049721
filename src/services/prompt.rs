// src/services/prompt.rs
use super::pipeline::END_OF_TURN;

pub const USER_INPUT_PLACEHOLDER: &str = "{user_input}";

pub const ITINERARY_SYSTEM_PROMPT: &str = r#"Sua única função é gerar um roteiro de viagem.
Formate a resposta usando tabelas Markdown para cada dia.

Use EXATAMENTE o seguinte formato Markdown para cada dia:

**Dia 1: [TÍTULO CRIATIVO PARA O DIA]**

| Período | Atividade | Dicas e Detalhes |
|---|---|---|
| Manhã | [Nome da atividade 1] | [Descrição ou dica útil sobre a atividade 1] |
| Tarde | [Nome da atividade 2] | [Descrição ou dica útil sobre a atividade 2] |
| Noite | [Nome da atividade 3] | [Descrição ou dica útil sobre a atividade 3] |

REGRAS ABSOLUTAS:
- Você DEVE começar a resposta diretamente com "**Dia 1**".
- Você NÃO DEVE fazer perguntas, criar diálogos, saudações ou conclusões.
- Sua resposta TERMINA estritamente após a tabela do último dia solicitado.
- Concentre-se EXCLUSIVAMENTE no destino fornecido pelo usuário. NÃO inclua outras cidades, estados ou países no roteiro."#;

/// A fixed system instruction plus a user turn with a `{user_input}` slot,
/// rendered in the Llama 3 chat format.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: String,
    user: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::itinerary()
    }
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    pub fn itinerary() -> Self {
        Self::new(ITINERARY_SYSTEM_PROMPT, USER_INPUT_PLACEHOLDER)
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn render(&self, user_input: &str) -> String {
        let user = self.user.replace(USER_INPUT_PLACEHOLDER, user_input);
        let mut prompt = String::from("<|begin_of_text|>");
        push_turn(&mut prompt, "system", &self.system);
        push_turn(&mut prompt, "user", &user);
        prompt.push_str("<|start_header_id|>assistant<|end_header_id|>\n\n");
        prompt
    }
}

fn push_turn(prompt: &mut String, role: &str, content: &str) {
    prompt.push_str("<|start_header_id|>");
    prompt.push_str(role);
    prompt.push_str("<|end_header_id|>\n\n");
    prompt.push_str(content.trim());
    prompt.push_str(END_OF_TURN);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_system_then_user_then_open_assistant_turn() {
        let template = PromptTemplate::new("Be brief.", "Trip: {user_input}");
        let prompt = template.render("3 days in Lisbon");
        assert_eq!(
            prompt,
            "<|begin_of_text|>\
             <|start_header_id|>system<|end_header_id|>\n\nBe brief.<|eot_id|>\
             <|start_header_id|>user<|end_header_id|>\n\nTrip: 3 days in Lisbon<|eot_id|>\
             <|start_header_id|>assistant<|end_header_id|>\n\n"
        );
    }

    #[test]
    fn itinerary_prompt_demands_day_one_heading() {
        let template = PromptTemplate::default();
        assert!(template.system().contains("**Dia 1**"));
        let prompt = template.render("Rio de Janeiro, 2 dias");
        assert!(prompt.contains("Rio de Janeiro, 2 dias<|eot_id|>"));
        assert!(prompt.ends_with("assistant<|end_header_id|>\n\n"));
    }

    #[test]
    fn user_text_is_inserted_verbatim() {
        let template = PromptTemplate::itinerary();
        let prompt = template.render("{weird} input");
        assert!(prompt.contains("{weird} input"));
    }
}
