const EXTRACTOR_INTRO: &str =
    "あなたは、画像から構造化データを抽出する専門家です。画像に含まれるグラフや表から、以下の情報を正確に読み取り、JSON形式で出力してください。";
const EXTRACTOR_FIELDS: &[&str] = &[
    "グラフのタイトル (title)",
    "X軸のラベルと単位 (xAxis: { label, unit })",
    "Y軸のラベルと単位 (yAxis: { label, unit })",
    "グラフ上のすべてのデータ点 (dataPoints: [{x, y}, ...])",
];
const EXTRACTOR_OUTRO: &str = "余計な説明は一切せず、JSONオブジェクトのみを厳密に出力してください。";

/// Text half of the extraction call. The image is attached separately.
pub fn build_extractor_prompt() -> String {
    let fields = EXTRACTOR_FIELDS
        .iter()
        .map(|field| format!("- {field}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{EXTRACTOR_INTRO}\n{fields}\n\n{EXTRACTOR_OUTRO}")
}
