//! Prompt template

/// Render the user prompt for one question
///
/// `options` is inserted verbatim and may be empty. Web content is appended
/// as-is after the instructions.
pub fn build_prompt(question: &str, options: &str, web_content: &str) -> String {
    format!(
        "Вопрос: {question}\n\n\
         Выберите правильный вариант:\n\
         {options}\n\n\
         Формат ответа:\n\
         {{ \"answer\": номер варианта, \"reasoning\": объяснение, \"sources\": [список источников] }}\n\
         Если вариантов нет, укажите \"answer\": null.\n\n\
         Информация из веб-источников:\n\
         {web_content}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embeds_all_parts() {
        let prompt = build_prompt("Когда основан ИТМО?", " 1900\n2. 1930", "ИТМО основан в 1900 году.");

        assert!(prompt.starts_with("Вопрос: Когда основан ИТМО?\n"));
        assert!(prompt.contains("Выберите правильный вариант:\n 1900\n2. 1930\n"));
        assert!(prompt.ends_with("Информация из веб-источников:\nИТМО основан в 1900 году.\n"));
    }

    #[test]
    fn test_states_reply_shape() {
        let prompt = build_prompt("q", "", "");
        assert!(prompt.contains(
            r#"{ "answer": номер варианта, "reasoning": объяснение, "sources": [список источников] }"#
        ));
        assert!(prompt.contains(r#""answer": null"#));
    }

    #[test]
    fn test_empty_options_and_context() {
        let prompt = build_prompt("What is ITMO?", "", "");
        assert!(prompt.contains("Выберите правильный вариант:\n\n\n"));
        assert!(prompt.ends_with("Информация из веб-источников:\n\n"));
    }

    #[test]
    fn test_content_is_not_escaped() {
        let prompt = build_prompt("q", "", r#"{"quoted": "braces"}"#);
        assert!(prompt.contains(r#"{"quoted": "braces"}"#));
    }
}
