//! Prompt text sent to the generation API.

pub mod extract;
pub mod solve;

/// How the explanation should be written.
const TUTOR_RULES_HEADER: &str = "【解説のルール】";
const TUTOR_RULES: &str = "解説は、日本の小学生や中学生にも分かるように、非常に丁寧な言葉遣いでお願いします。答えだけでなく、その答えに至るまでの考え方、途中式、重要なポイントを、順を追って詳しく説明してください。";

/// How the explanation must be formatted.
const OUTPUT_RULES_HEADER: &str = "【出力形式】";
const OUTPUT_RULES: &str = "最終的な出力は、すべての漢字にふりがなを振ったHTML形式で生成してください。ふりがなは、<ruby>漢字<rt>かんじ</rt></ruby>のように、必ずHTMLのrubyタグを使用してください。";

/// Rules shared by every prompt that produces the final answer.
fn answer_rules() -> String {
    format!("{TUTOR_RULES_HEADER}\n{TUTOR_RULES}\n\n{OUTPUT_RULES_HEADER}\n{OUTPUT_RULES}")
}
