//! HTML rendering for the admin pages.
//!
//! Views take plain data and return markup; they never touch the store.

use std::fmt::Write;

use schoolcal_core::{Event, EventQuery, EventType, Grade};

pub const PAGE_SIZE: usize = 20;

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
form.event { max-width: 600px; }
label { display: block; margin-top: 10px; }
form.event input, form.event textarea, form.event select { width: 100%; padding: 8px; margin-top: 5px; }
button { margin-top: 15px; padding: 8px 12px; background-color: #007bff; color: white; border: none; cursor: pointer; }
button:hover { background-color: #0056b3; }
button.danger { background-color: #dc3545; }
table { border-collapse: collapse; width: 100%; margin-top: 15px; }
th, td { border: 1px solid #ccc; padding: 6px; text-align: left; vertical-align: top; }
.filters input, .filters select { margin-right: 8px; }
.pager a, .pager span { margin-right: 8px; }
@media print { form, .pager, .actions, .no-print { display: none; } }
";

/// One page of a longer list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based
    pub number: usize,
    pub size: usize,
    pub total_items: usize,
}

impl Page {
    /// Clamp `requested` into the valid page range for `total_items`.
    pub fn new(requested: Option<usize>, total_items: usize) -> Self {
        let mut page = Page {
            number: 1,
            size: PAGE_SIZE,
            total_items,
        };
        page.number = requested.unwrap_or(1).clamp(1, page.total_pages());
        page
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.size).max(1)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = ((self.number - 1) * self.size).min(items.len());
        let end = (start + self.size).min(items.len());
        &items[start..end]
    }
}

/// Everything the admin listing needs
pub struct AdminView<'a> {
    pub events: &'a [Event],
    pub query: &'a EventQuery,
    pub page: Page,
}

pub fn admin_page(view: &AdminView) -> String {
    let mut body = String::new();
    body.push_str("<h1>後端管理平台</h1>\n");
    body.push_str(
        "<p class=\"no-print\">\
         <a href=\"/api/events\">JSON</a> | \
         <a href=\"/api/history\">修訂紀錄</a> | ",
    );
    let _ = write!(
        body,
        "<a href=\"/admin/export.csv{}\">匯出 CSV</a> | \
         <a href=\"#\" onclick=\"window.print(); return false;\">列印</a></p>\n",
        query_suffix(view.query, None)
    );

    body.push_str(&filter_form(view.query));
    body.push_str(&event_table(view));
    body.push_str(&pager(view.query, view.page));

    body.push_str("<h2>新增事件</h2>\n");
    body.push_str(&event_form("/admin/add", None, "新增事件"));

    body.push_str(
        "<h2>清除所有事件</h2>\n\
         <form action=\"/admin/clear\" method=\"POST\" \
         onsubmit=\"return confirm('確定要刪除所有事件嗎？');\">\
         <button type=\"submit\" class=\"danger\">清除全部</button></form>\n",
    );

    layout("後端管理平台", &body)
}

pub fn edit_page(event: &Event) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>編輯事件 #{}</h1>", event.id);
    body.push_str(&event_form("/admin/update/save", Some(event), "儲存變更"));
    body.push_str("<p><a href=\"/admin\">返回</a></p>\n");
    layout("編輯事件", &body)
}

/// Confirmation or error page with a link back to the admin page.
pub fn message_page(message: &str) -> String {
    let body = format!(
        "<p>{}</p>\n<p><a href=\"/admin\">返回</a></p>\n",
        escape(message)
    );
    layout("後端管理平台", &body)
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        STYLE,
        body
    )
}

fn filter_form(query: &EventQuery) -> String {
    let value = |v: &Option<String>| escape(v.as_deref().unwrap_or(""));
    let mut html = String::from("<form class=\"filters\" action=\"/admin\" method=\"GET\">\n");
    let _ = writeln!(
        html,
        "<input type=\"text\" name=\"search\" placeholder=\"關鍵字\" value=\"{}\">",
        value(&query.search)
    );

    html.push_str("<select name=\"type\"><option value=\"\">所有類型</option>");
    for kind in EventType::ALL {
        let selected = query.kind.as_deref() == Some(kind.as_str());
        html.push_str(&option(kind.as_str(), kind.label(), selected));
    }
    html.push_str("</select>\n");

    html.push_str("<select name=\"grade\"><option value=\"\">所有年級</option>");
    for grade in Grade::ALL {
        let selected = query.grade.as_deref() == Some(grade.as_str());
        html.push_str(&option(grade.as_str(), grade.label(), selected));
    }
    html.push_str("</select>\n");

    let _ = writeln!(
        html,
        "<input type=\"date\" name=\"start\" value=\"{}\"> ~ \
         <input type=\"date\" name=\"end\" value=\"{}\">",
        value(&query.start),
        value(&query.end)
    );
    html.push_str("<button type=\"submit\">篩選</button> <a href=\"/admin\">清除篩選</a>\n</form>\n");
    html
}

fn event_table(view: &AdminView) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<p>共 {} 筆事件</p>", view.page.total_items);

    if view.events.is_empty() {
        html.push_str("<p>目前沒有事件。</p>\n");
        return html;
    }

    html.push_str(
        "<table>\n<tr><th>ID</th><th>日期</th><th>標題</th><th>描述</th>\
         <th>類型</th><th>年級</th><th>連結</th><th class=\"actions\">操作</th></tr>\n",
    );

    for event in view.events {
        let dates = if event.start == event.end {
            event.start.to_string()
        } else {
            format!("{} ~ {}", event.start, event.end)
        };
        let grades = event
            .grade
            .iter()
            .map(|g| g.label())
            .collect::<Vec<_>>()
            .join("、");
        let link = if event.link.is_empty() {
            String::new()
        } else {
            format!(
                "<a href=\"{0}\" target=\"_blank\" rel=\"noopener\">{0}</a>",
                escape(&event.link)
            )
        };

        let _ = writeln!(
            html,
            "<tr><td>{id}</td><td>{dates}</td><td>{title_zh}<br>{title_en}</td>\
             <td>{desc_zh}<br>{desc_en}</td><td>{kind}</td><td>{grades}</td><td>{link}</td>\
             <td class=\"actions\"><a href=\"/admin/update?id={id}\">編輯</a>\
             <form action=\"/admin/delete\" method=\"POST\" \
             onsubmit=\"return confirm('確定要刪除這個事件嗎？');\">\
             <input type=\"hidden\" name=\"id\" value=\"{id}\">\
             <button type=\"submit\" class=\"danger\">刪除</button></form></td></tr>",
            id = event.id,
            dates = dates,
            title_zh = escape(&event.title.zh),
            title_en = escape(&event.title.en),
            desc_zh = escape(&event.description.zh),
            desc_en = escape(&event.description.en),
            kind = event.kind.label(),
            grades = grades,
            link = link,
        );
    }

    html.push_str("</table>\n");
    html
}

fn pager(query: &EventQuery, page: Page) -> String {
    if page.total_pages() <= 1 {
        return String::new();
    }

    let mut html = String::from("<p class=\"pager\">");
    if page.number > 1 {
        let _ = write!(
            html,
            "<a href=\"/admin{}\">上一頁</a>",
            query_suffix(query, Some(page.number - 1))
        );
    }
    let _ = write!(html, "<span>第 {} / {} 頁</span>", page.number, page.total_pages());
    if page.number < page.total_pages() {
        let _ = write!(
            html,
            "<a href=\"/admin{}\">下一頁</a>",
            query_suffix(query, Some(page.number + 1))
        );
    }
    html.push_str("</p>\n");
    html
}

/// `?search=..&page=..` for the non-empty filter values, escaped for an attribute.
fn query_suffix(query: &EventQuery, page: Option<usize>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let params = [
        ("search", &query.search),
        ("type", &query.kind),
        ("grade", &query.grade),
        ("start", &query.start),
        ("end", &query.end),
    ];
    for (name, value) in params {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            serializer.append_pair(name, value);
        }
    }
    if let Some(page) = page {
        serializer.append_pair("page", &page.to_string());
    }

    let encoded = serializer.finish();
    if encoded.is_empty() {
        String::new()
    } else {
        format!("?{}", escape(&encoded))
    }
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        "<option value=\"{}\"{}>{}</option>",
        escape(value),
        if selected { " selected" } else { "" },
        escape(label)
    )
}

/// Add/edit form. `event` prefills the fields and adds the hidden id.
fn event_form(action: &str, event: Option<&Event>, submit: &str) -> String {
    let text = |f: fn(&Event) -> &str| event.map(|e| escape(f(e))).unwrap_or_default();
    let start = event.map(|e| e.start.to_string()).unwrap_or_default();
    let end = event.map(|e| e.end.to_string()).unwrap_or_default();

    let mut html = format!("<form class=\"event\" action=\"{action}\" method=\"POST\">\n");
    if let Some(event) = event {
        let _ = writeln!(html, "<input type=\"hidden\" name=\"id\" value=\"{}\">", event.id);
    }

    let _ = write!(
        html,
        "<label for=\"start\">開始日期 (YYYY-MM-DD):</label>\n\
         <input type=\"date\" id=\"start\" name=\"start\" value=\"{start}\" required>\n\
         <label for=\"end\">結束日期 (YYYY-MM-DD，可選):</label>\n\
         <input type=\"date\" id=\"end\" name=\"end\" value=\"{end}\">\n\
         <label for=\"title_zh\">標題（中文）:</label>\n\
         <input type=\"text\" id=\"title_zh\" name=\"title_zh\" value=\"{title_zh}\" required>\n\
         <label for=\"title_en\">標題（英文）:</label>\n\
         <input type=\"text\" id=\"title_en\" name=\"title_en\" value=\"{title_en}\">\n\
         <label for=\"description_zh\">描述（中文）:</label>\n\
         <textarea id=\"description_zh\" name=\"description_zh\">{desc_zh}</textarea>\n\
         <label for=\"description_en\">描述（英文）:</label>\n\
         <textarea id=\"description_en\" name=\"description_en\">{desc_en}</textarea>\n",
        title_zh = text(|e| e.title.zh.as_str()),
        title_en = text(|e| e.title.en.as_str()),
        desc_zh = text(|e| e.description.zh.as_str()),
        desc_en = text(|e| e.description.en.as_str()),
    );

    html.push_str("<label for=\"type\">事件類型:</label>\n<select id=\"type\" name=\"type\">");
    for kind in EventType::ALL {
        let selected = event.is_some_and(|e| e.kind == kind);
        html.push_str(&option(kind.as_str(), kind.label(), selected));
    }
    html.push_str("</select>\n");

    html.push_str(
        "<label for=\"grade\">年級標籤:</label>\n<select id=\"grade\" name=\"grade\" multiple>",
    );
    for grade in Grade::ALL {
        let selected = event.is_some_and(|e| e.grade.contains(grade));
        html.push_str(&option(grade.as_str(), grade.label(), selected));
    }
    html.push_str("</select>\n");

    let _ = write!(
        html,
        "<label for=\"link\">超連結 (可選):</label>\n\
         <input type=\"url\" id=\"link\" name=\"link\" value=\"{}\" placeholder=\"https://example.com\">\n\
         <button type=\"submit\">{}</button>\n</form>\n",
        text(|e| e.link.as_str()),
        escape(submit)
    );
    html
}
