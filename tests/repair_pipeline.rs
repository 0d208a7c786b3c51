use serde_json::json;
use studyrepair_rs::repair::{
    double_invalid_backslashes, extract_json_payload, ExtractSource, LatexRepairTable, ParseStage,
    PayloadShape,
};
use studyrepair_rs::{
    parse_quiz_bundle, parse_study_bundle, FinishReason, MalformedCause, ResponseRepairer,
};

#[test]
fn test_extraction_of_clean_json_is_identity() {
    for input in [r#"{"a":1}"#, "  [1, 2, 3]\n", "\n{\"nested\": {\"b\": [true]}}  "] {
        let extracted = extract_json_payload(Some(input), PayloadShape::Object);
        assert_eq!(extracted.json, input.trim());
        assert_eq!(extracted.source, ExtractSource::Bare);
    }
}

#[test]
fn test_fence_with_prose_around_it() {
    let raw = "prefix text ```json\n{\"a\":1}\n``` suffix";
    let extracted = extract_json_payload(Some(raw), PayloadShape::Object);
    assert_eq!(extracted.json, r#"{"a":1}"#);
    assert_eq!(extracted.source, ExtractSource::Fenced);
}

#[test]
fn test_backslash_repair_keeps_latex_literal() {
    let raw = r#"{"x": "\alpha + \beta"}"#;
    assert!(serde_json::from_str::<serde_json::Value>(raw).is_err());

    let (fixed, doubled) = double_invalid_backslashes(raw);
    assert_eq!(doubled, 1);
    let value: serde_json::Value = serde_json::from_str(&fixed).expect("repaired parse");
    let text = value["x"].as_str().expect("string");
    assert!(text.starts_with(r"\alpha"));
    assert!(!text.contains('\u{3b1}'));
}

#[test]
fn test_illegal_escape_letters_survive_as_commands() {
    let repairer = ResponseRepairer::default();
    for command in [r"\alpha", r"\cdot", r"\sigma", r"\pi", r"\lambda", r"\mu", r"\delta", r"\sqrt"] {
        let raw = format!(r#"{{"x": "{command}"}}"#);
        let out = repairer
            .repair_json(Some(raw.as_str()), PayloadShape::Object, &FinishReason::Stop)
            .expect("parse");
        assert_eq!(out.value["x"], command, "fixture {raw}");
        assert_eq!(out.report.stage, ParseStage::BackslashRepaired);
    }
}

#[test]
fn test_legal_escape_letters_are_rebuilt_by_deep_repair() {
    let repairer = ResponseRepairer::default();
    for command in [
        r"\frac{a}{b}",
        r"\theta",
        r"\times",
        r"\nabla",
        r"\neq",
        r"\beta",
        r"\begin{matrix}",
        r"\rho",
        r"\rightarrow",
    ] {
        let raw = format!(r#"{{"x": "{command}"}}"#);
        let out = repairer
            .repair_json(Some(raw.as_str()), PayloadShape::Object, &FinishReason::Stop)
            .expect("parse");
        assert_eq!(out.value["x"], command, "fixture {raw}");
        assert_eq!(out.report.stage, ParseStage::Direct);
        assert_eq!(out.report.latex_fixes, 1);
    }
}

#[test]
fn test_deep_repair_rebuilds_formfeed_frac() {
    let table = LatexRepairTable::seed();
    let corrupted = "\u{0C}rac{1}{2}";
    assert_eq!(table.repair_str(corrupted), r"\frac{1}{2}");
}

#[test]
fn test_clean_math_is_untouched() {
    let raw = r#"{"f": "\\frac{1}{2} + \\sqrt{x} = 3", "plain": "no math here"}"#;
    let (fixed, doubled) = double_invalid_backslashes(raw);
    assert_eq!(doubled, 0);
    assert_eq!(fixed, raw);

    let out = ResponseRepairer::default()
        .repair_json(Some(raw), PayloadShape::Object, &FinishReason::Stop)
        .expect("parse");
    assert_eq!(out.value["f"], r"\frac{1}{2} + \sqrt{x} = 3");
    assert_eq!(out.value["plain"], "no math here");
    assert!(!out.report.was_repaired());
}

#[test]
fn test_truncation_message_differs_from_malformed() {
    let raw = r#"{"studyPlan": {"title": "Calculus", "steps": [{"title": "Lim"#;

    let truncated = parse_study_bundle(raw, "MAX_TOKENS").expect_err("truncated");
    assert_eq!(truncated.cause(), MalformedCause::Truncated);
    assert!(truncated.to_string().contains("truncated"));

    let malformed = parse_study_bundle(raw, "STOP").expect_err("malformed");
    assert_eq!(malformed.cause(), MalformedCause::Malformed);
    assert_ne!(truncated.to_string(), malformed.to_string());

    let quiz = parse_quiz_bundle("[{\"question\": \"Wh", "MAX_TOKENS").expect_err("quiz");
    assert_eq!(quiz.cause(), MalformedCause::Truncated);
}

#[test]
fn test_deep_repair_reaches_every_depth() {
    let mut value = json!({
        "outer": [
            {"inner": "\u{0C}rac{1}{2}", "n": 3, "ok": true, "none": null},
            [["\u{09}heta"]]
        ],
        "score": 1.5
    });
    let fixed = LatexRepairTable::seed().repair_value(&mut value);
    assert_eq!(fixed, 2);
    assert_eq!(
        value,
        json!({
            "outer": [
                {"inner": r"\frac{1}{2}", "n": 3, "ok": true, "none": null},
                [[r"\theta"]]
            ],
            "score": 1.5
        })
    );
}

#[test]
fn test_end_to_end_study_bundle() {
    let raw = "```json\n{\"studyPlan\":{\"title\":\"T\",\"overview\":\"O\",\"topics\":[],\"steps\":[{\"title\":\"S1\",\"description\":\"D\",\"detailedNotes\":[{\"heading\":\"H\",\"bullets\":[\"point one\"]}]}]},\"flashcards\":[],\"isStudyMaterial\":true,\"validityWarning\":\"\"}\n```";
    let bundle = parse_study_bundle(raw, "STOP").expect("bundle");
    assert_eq!(bundle.study_plan.title, "T");
    assert_eq!(bundle.study_plan.steps[0].detailed_notes[0].heading, "H");
    assert_eq!(bundle.study_plan.steps[0].detailed_notes[0].bullets, vec!["point one"]);
    assert!(bundle.is_study_material);
}

#[test]
fn test_end_to_end_quiz_with_mixed_corruption() {
    let raw = "Here is your quiz:\n```json\n[{\"question\": \"Evaluate \\frac{1}{2} \\cdot 4\", \"options\": [\"1\", \"2\"], \"correctAnswer\": \"2\", \"explanation\": \"\\alpha is unused\"}]\n```";
    let questions = parse_quiz_bundle(raw, "STOP").expect("quiz");
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].question, r"Evaluate \frac{1}{2} \cdot 4");
    assert_eq!(questions[0].explanation, r"\alpha is unused");
    assert!(questions[0].answer_is_listed());
}

#[test]
fn test_bracketed_preamble_before_fenced_quiz() {
    let raw = "[Generated quiz]\n```json\n[{\"question\":\"q\"}]\n```";
    let questions = parse_quiz_bundle(raw, "STOP").expect("quiz");
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].question, "q");
}

#[test]
fn test_non_quiz_objects_are_rejected() {
    let single = r#"{"question":"What is \\frac{1}{2}?","options":["0.5","2"],"correctAnswer":"0.5","explanation":"half"}"#;
    let err = parse_quiz_bundle(single, "STOP").expect_err("single question object");
    assert_eq!(err.cause(), MalformedCause::Malformed);

    let study = r#"{"studyPlan":{"title":"T"},"flashcards":[]}"#;
    let err = parse_quiz_bundle(study, "STOP").expect_err("study bundle");
    assert_eq!(err.cause(), MalformedCause::Malformed);

    let wrapped = r#"{"questions":[{"question":"q","options":["a"],"correctAnswer":"a","explanation":"e"}]}"#;
    assert_eq!(parse_quiz_bundle(wrapped, "STOP").expect("wrapped").len(), 1);
}

#[test]
fn test_array_is_rejected_as_study_bundle() {
    let err = parse_study_bundle("[]", "STOP").expect_err("array");
    assert_eq!(err.cause(), MalformedCause::Malformed);
    assert!(parse_study_bundle("", "STOP").is_ok());
}
