use super::ChangeLedger;

const HEADER: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>DNS Update Report</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 20px; }
        table { border-collapse: collapse; width: 100%; }
        th, td { border: 1px solid #ddd; padding: 8px; }
        th { background-color: #4CAF50; color: white; }
        tr:nth-child(even) { background-color: #f2f2f2; }
    </style>
</head>
<body>
<h2>DNS Update Report</h2>
"#;

const FOOTER: &str = "</table>\n</body>\n</html>\n";

pub(super) fn render(ledger: &ChangeLedger) -> String {
    let mut out = String::from(HEADER);
    out.push_str(&format!(
        "<p>Generated {}</p>\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str("<table>\n");
    out.push_str(
        "<tr><th>Domain</th><th>Record ID</th><th>Type</th>\
         <th>Old Content</th><th>New Content</th><th>Status</th></tr>\n",
    );

    for entry in ledger.entries() {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&entry.domain),
            escape(&entry.record_id),
            escape(&entry.record_type),
            escape(&entry.old_content),
            escape(&entry.new_content),
            entry.status,
        ));
    }

    out.push_str(FOOTER);
    out
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
