//! Prompt builders for the Zhipu provider. The daily prompt demands a
//! fixed-shape JSON object; the range prompt demands fixed-section
//! markdown. Both are best-effort contracts with the model.

use crate::models::entry::TimeEntryRow;

pub fn daily_analysis_prompt(entries: &[TimeEntryRow]) -> String {
    let entries_text = entries
        .iter()
        .map(|e| {
            let thought = e
                .thought
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(|t| format!("（想法: {t}）"))
                .unwrap_or_default();
            format!("- {}-{}: {}{}", e.start_time, e.end_time, e.activity, thought)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"你是一个时间管理与正念教练。请基于当天记录，输出清晰、简洁、条目化的分析。
当天记录：
{entries_text}

只返回 JSON（不要任何其他文字）。JSON 结构如下：
{{
  "summary": "总结：\n- 早上（06-12）：...\n- 中午（12-14）：...\n- 下午（14-18）：...\n- 晚上（18-24）：...\n- 关键事件：...",
  "dailyNarrative": "第一人称的日记式总结（2-4 句）",
  "timeDistribution": {{
    "输入": 2.0,
    "思考": 1.5,
    "输出": 2.5,
    "通勤": 1.0,
    "吃饭": 1.0,
    "休息": 1.5,
    "其他": 0.5
  }},
  "energyMoodCurve": {{
    "早上": "...",
    "下午": "...",
    "晚上": "..."
  }},
  "patterns": [
    "重复出现的模式或习惯（可为空）"
  ],
  "insights": [
    "洞察：效率结构（输入/思考/输出/通勤/吃饭/休息/其他）占比与特点",
    "洞察：如有情绪表达，给出当天情绪结论；没有则写“未明显出现情绪词”"
  ],
  "focusScore": 75,
  "highlights": [
    "做得好的点（条目化）"
  ],
  "improvements": [
    "改进建议（面向明天，条目化、具体可执行）"
  ]
}}

要求：
1) summary 必须按早上/中午/下午/晚上总结，并包含关键事件。
2) timeDistribution 用“小时数（数字）”，总和约等于当天记录时长。
3) insights = 洞察（效率与情绪分析）。
4) highlights = 做得好的点。
5) improvements = 改进建议。
6) 语言：中文，简洁，条目化。"#
    )
}

pub fn range_summary_prompt(documents: &[(String, String)], range_label: &str) -> String {
    let docs_text = documents
        .iter()
        .map(|(date, content)| format!("【{date}】\n{content}"))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"你是一个时间管理与正念教练。请基于以下已保存的分析文档，总结{range_label}的整体表现。
要求：中文、简洁、条目化；只输出 Markdown，不要输出 JSON 或其它说明。

文档内容：
{docs_text}

输出格式（Markdown）：
## 总结
- ...

## 洞察
- ...

## 做得好的点
- ...

## 改进建议
- ..."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(start: &str, end: &str, activity: &str, thought: Option<&str>) -> TimeEntryRow {
        TimeEntryRow {
            id: Uuid::new_v4(),
            date: "2024-01-01".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            activity: activity.to_string(),
            thought: thought.map(str::to_string),
            is_same_as_previous: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_daily_prompt_lists_entries() {
        let prompt = daily_analysis_prompt(&[
            entry("09:00", "09:30", "写代码", Some("专注")),
            entry("09:30", "10:00", "开会", None),
        ]);
        assert!(prompt.contains("- 09:00-09:30: 写代码（想法: 专注）"));
        assert!(prompt.contains("- 09:30-10:00: 开会\n"));
        assert!(prompt.contains("\"focusScore\""));
    }

    #[test]
    fn test_range_prompt_labels_documents() {
        let docs = vec![("2024-01-01".to_string(), "## 总结\n- ok".to_string())];
        let prompt = range_summary_prompt(&docs, "最近一个月");
        assert!(prompt.contains("总结最近一个月的整体表现"));
        assert!(prompt.contains("【2024-01-01】"));
        assert!(prompt.contains("## 改进建议"));
    }
}
