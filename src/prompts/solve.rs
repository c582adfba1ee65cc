use serde_json::Value;

use super::answer_rules;

const TUTOR_INTRO: &str = "あなたは優秀で親切な家庭教師です。";
const DATA_INTRO: &str = "以下のデータは、あるグラフから抽出されたものです。";
const GRAPH_QUESTION: &str = "このグラフの問題を解いてください";
const DIRECT_TASK: &str =
    "添付された画像に写っている問題を読み取り、その問題を解いてください。問題文や図表の内容もよく確認してください。";

/// Second step of the two-step pipeline: answer from extracted data.
pub fn build_solver_prompt(extracted: &Value) -> String {
    // Pretty-printing a Value cannot fail.
    let data = serde_json::to_string_pretty(extracted).unwrap_or_else(|_| extracted.to_string());
    format!(
        "{TUTOR_INTRO}\n\n{DATA_INTRO}\n\n{data}\n\nこのデータに基づいて、ユーザーの最初の質問である「{GRAPH_QUESTION}」に答えてください。\n\n{rules}",
        rules = answer_rules(),
    )
}

/// Single-step pipeline: answer straight from the attached image.
pub fn build_direct_prompt() -> String {
    format!(
        "{TUTOR_INTRO}\n\n{DIRECT_TASK}\n\n{rules}",
        rules = answer_rules()
    )
}
