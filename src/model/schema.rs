//! JSON Schemas for the two bundle shapes.
//!
//! These are handed to the upstream model as its structured-output schema, so
//! they list the fields the prompt requires even though parsing tolerates
//! their absence.

use serde_json::{json, Value};

fn string_array() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn section_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "heading": { "type": "string" },
            "body": { "type": "string" },
            "bullets": string_array(),
            "formulas": string_array(),
        },
        "required": ["heading", "bullets"],
    })
}

/// Schema for a study-plan-plus-flashcards response.
#[must_use]
pub fn study_bundle_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "isStudyMaterial": { "type": "boolean" },
            "validityWarning": { "type": "string" },
            "studyPlan": {
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "overview": { "type": "string" },
                    "topics": string_array(),
                    "steps": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "title": { "type": "string" },
                                "description": { "type": "string" },
                                "detailedNotes": {
                                    "type": "array",
                                    "items": section_schema(),
                                },
                            },
                            "required": ["title", "description", "detailedNotes"],
                        },
                    },
                },
                "required": ["title", "overview", "topics", "steps"],
            },
            "flashcards": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "question": { "type": "string" },
                        "answer": { "type": "string" },
                        "category": { "type": "string" },
                        "stepTitle": { "type": "string" },
                    },
                    "required": ["question", "answer", "stepTitle"],
                },
            },
        },
        "required": ["isStudyMaterial", "validityWarning", "studyPlan", "flashcards"],
    })
}

/// Schema for a quiz response (a bare array of questions).
#[must_use]
pub fn quiz_bundle_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "question": { "type": "string" },
                "options": string_array(),
                "correctAnswer": { "type": "string" },
                "explanation": { "type": "string" },
            },
            "required": ["question", "options", "correctAnswer", "explanation"],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_requires_heading_and_bullets() {
        let schema = study_bundle_schema();
        let section = &schema["properties"]["studyPlan"]["properties"]["steps"]["items"]
            ["properties"]["detailedNotes"]["items"];
        assert_eq!(section["required"], json!(["heading", "bullets"]));
    }

    #[test]
    fn test_quiz_schema_is_array() {
        assert_eq!(quiz_bundle_schema()["type"], "array");
    }
}
