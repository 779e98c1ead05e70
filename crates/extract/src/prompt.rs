use crate::error::ExtractError;
use crate::schema::{ExtractionMode, Message};

pub const TEXT_BEGIN: &str = "-------Text begin-------";
pub const TEXT_END: &str = "-------Text end-------";

pub const SYSTEM_INSTRUCTIONS: &str = r#"
A chat between a curious user and an artificial intelligence Assistant. The Assistant is an expert at identifying entities and relationships in text. The Assistant responds in JSON output only.

The User provides text in the format:

-------Text begin-------
<User provided text>
-------Text end-------

The Assistant follows the following steps before replying to the User:

1. **identify the most important entities** The Assistant identifies the most important entities in the text. These entities are listed in the JSON output under the key "nodes", they follow the structure of a list of dictionaries where each dict is:

"nodes":[{"id": <entity N>, "type": <type>, "detailed_type": <detailed type>}, ...]

where "type": <type> is a broad categorization of the entity. "detailed type": <detailed_type>  is a very descriptive categorization of the entity.

2. **determine relationships** The Assistant uses the text between -------Text begin------- and -------Text end------- to determine the relationships between the entities identified in the "nodes" list defined above. These relationships are called "edges" and they follow the structure of:

"edges":[{"from": <entity 1>, "to": <entity 2>, "label": <relationship>}, ...]

The <entity N> must correspond to the "id" of an entity in the "nodes" list.

The Assistant never repeats the same node twice. The Assistant never repeats the same edge twice.
The Assistant responds to the User in JSON only, according to the following JSON schema:

{"type":"object","properties":{"nodes":{"type":"array","items":{"type":"object","properties":{"id":{"type":"string"},"type":{"type":"string"},"detailed_type":{"type":"string"}},"required":["id","type","detailed_type"],"additionalProperties":false}},"edges":{"type":"array","items":{"type":"object","properties":{"from":{"type":"string"},"to":{"type":"string"},"label":{"type":"string"}},"required":["from","to","label"],"additionalProperties":false}}},"required":["nodes","edges"],"additionalProperties":false}
"#;

/// NuExtract output skeleton, field order preserved.
pub const NUEXTRACT_TEMPLATE: &str = r#"{
    "Nodes": [
        {
            "id": "",
            "type": "",
            "detailed_type": ""
        }
    ],
    "Edges": [
        {
            "from": "",
            "to": "",
            "label": ""
        }
    ]
}"#;

/// Build the chat messages for an article in the given extraction mode
pub fn build_messages(article_text: &str, mode: ExtractionMode) -> Vec<Message> {
    match mode {
        ExtractionMode::Default => build_default_messages(article_text),
        ExtractionMode::NuExtract => build_nuextract_messages(article_text),
    }
}

/// Same as [`build_messages`], for a mode given as a config/CLI tag
pub fn build_messages_for_tag(article_text: &str, tag: &str) -> Result<Vec<Message>, ExtractError> {
    let mode: ExtractionMode = tag.parse()?;
    Ok(build_messages(article_text, mode))
}

pub fn build_default_messages(article_text: &str) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_INSTRUCTIONS),
        Message::user(format!("{}\n{}\n{}", TEXT_BEGIN, article_text, TEXT_END)),
    ]
}

pub fn build_nuextract_messages(article_text: &str) -> Vec<Message> {
    let prompt = format!(
        "<|input|>\n### Template:\n{}\n### Text:\n{}\n\n<|output|>",
        NUEXTRACT_TEMPLATE, article_text
    );
    vec![Message::user(prompt)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Role;

    #[test]
    fn test_default_has_system_and_user() {
        let messages = build_messages("Some article.", ExtractionMode::Default);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_INSTRUCTIONS);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(
            messages[1].content,
            "-------Text begin-------\nSome article.\n-------Text end-------"
        );
    }

    #[test]
    fn test_nuextract_single_user_message() {
        let messages = build_messages("Some article.", ExtractionMode::NuExtract);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        let content = &messages[0].content;
        assert!(content.starts_with("<|input|>\n### Template:\n{"));
        assert!(content.ends_with("### Text:\nSome article.\n\n<|output|>"));
    }

    #[test]
    fn test_template_is_valid_json() {
        let template: serde_json::Value = serde_json::from_str(NUEXTRACT_TEMPLATE).unwrap();
        assert_eq!(template["Nodes"][0]["detailed_type"], "");
        assert_eq!(template["Edges"][0]["label"], "");
    }

    #[test]
    fn test_empty_text_accepted() {
        assert_eq!(build_messages("", ExtractionMode::Default).len(), 2);
        assert_eq!(build_messages("", ExtractionMode::NuExtract).len(), 1);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = build_messages_for_tag("text", "graph").unwrap_err();
        assert_eq!(err, ExtractError::UnknownMode("graph".to_string()));

        assert_eq!(build_messages_for_tag("text", "nuextract").unwrap().len(), 1);
    }
}
