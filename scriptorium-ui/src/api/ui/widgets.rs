//! Reusable HTML fragments: completion grid, selectors, draft lists, tables

use scriptorium_common::books::{self, Testament, BOOK_GROUPS};
use scriptorium_common::model::{Draft, Scripture};
use scriptorium_common::progress::{
    group_drafts_by_source, sorted_draft_sources, BookProgress, CompletionReport, ResultTable,
};
use scriptorium_common::selection::{completion_text, BookSelection, ScriptureSelection};
use std::collections::BTreeMap;

use super::layout::escape;

/// Per-book completion grid with overall and per-group counts
pub fn completion_grid(report: &CompletionReport) -> String {
    let ot_total = CompletionReport::testament_total(Testament::Old);
    let nt_total = CompletionReport::testament_total(Testament::New);

    let mut groups = String::new();
    for group in &report.groups {
        let chips: String = group.chips.iter().map(progress_chip).collect();
        let drafted = if group.drafted > 0 {
            format!(r#"<span class="drafted-count">{} drafted</span>"#, group.drafted)
        } else {
            String::new()
        };
        groups.push_str(&format!(
            r#"<div class="book-group group-{key}">
    <div class="group-header">
        <h4>{title}</h4>
        <span class="badge testament">{testament}</span>
        <span>{completed} completed</span>
        {drafted}
    </div>
    <div class="chips">{chips}</div>
</div>
"#,
            key = group.group.key,
            title = escape(group.group.title),
            testament = group.group.testament,
            completed = group.completed,
        ));
    }

    format!(
        r#"<div class="completion">
    <div class="completion-summary">
        <div class="stat"><strong>{completed}</strong> completed</div>
        <div class="stat"><strong>{in_progress}</strong> in progress</div>
        <div class="stat"><strong>{drafted}</strong> drafted</div>
        <div class="stat"><strong>{not_started}</strong> not started</div>
        <div class="stat">of <strong>{total}</strong> books</div>
    </div>
    <div class="completion-testaments">
        <span>OT: {ot_completed}/{ot_total} complete, {ot_drafted} drafted</span>
        <span>NT: {nt_completed}/{nt_total} complete, {nt_drafted} drafted</span>
    </div>
    {groups}
</div>"#,
        completed = report.completed,
        in_progress = report.in_progress,
        drafted = report.drafted,
        not_started = report.not_started,
        total = report.total,
        ot_completed = report.ot_completed,
        ot_drafted = report.ot_drafted,
        nt_completed = report.nt_completed,
        nt_drafted = report.nt_drafted,
    )
}

fn progress_chip(chip: &BookProgress) -> String {
    let title = format!(
        "{}: {}%{}",
        chip.name(),
        chip.percent,
        if chip.drafted { " (Drafted)" } else { "" }
    );
    let fill = if chip.percent > 0.0 {
        format!(
            r#"<span class="fill tone-{}" style="width: {}%"></span>"#,
            chip.tone().as_str(),
            chip.fill_percent()
        )
    } else {
        String::new()
    };
    let dot = if chip.drafted {
        r#"<span class="draft-dot" title="AI Draft Available">AI</span>"#
    } else {
        ""
    };
    format!(
        r#"<span class="chip state-{state}" title="{title}">{fill}<span class="code">{code}</span>{dot}</span>"#,
        state = chip.state.as_str(),
        title = escape(&title),
        code = escape(&chip.code),
    )
}

/// Drafts grouped by source text, as on the project page
pub fn draft_groups(drafts: &[&Draft]) -> String {
    if drafts.is_empty() {
        return r#"<div class="muted">No Drafts</div>"#.to_string();
    }

    let owned: Vec<Draft> = drafts.iter().map(|d| (*d).clone()).collect();
    let mut out = String::from(r#"<div class="draft-groups">"#);
    for (source, members) in group_drafts_by_source(&owned) {
        let books: String = members
            .iter()
            .map(|d| format!(r#"<span class="book-tag">{}</span> "#, escape(&d.book_name)))
            .collect();
        out.push_str(&format!(
            r#"<div class="draft-group"><h3>~ {} ~</h3><div>{}</div></div>"#,
            escape(&source),
            books
        ));
    }
    out.push_str("</div>");
    out
}

/// Drafts listed under each source in sorted order; `*` marks a rendered PDF
pub fn draft_sources(drafts: &[Draft]) -> String {
    let mut out = String::new();
    for (i, source) in sorted_draft_sources(drafts).into_iter().enumerate() {
        if i > 0 {
            out.push_str("<hr>");
        }
        let books: String = drafts
            .iter()
            .filter(|d| d.source_scripture_name == source)
            .map(|d| {
                format!(
                    r#"<div class="book-tag">{}{}</div>"#,
                    escape(&d.book_name),
                    if d.has_pdf { "*" } else { "" }
                )
            })
            .collect();
        out.push_str(&format!(
            r#"<div class="draft-source"><h4>{}</h4><div class="book-tags">{}</div></div>"#,
            escape(source),
            books
        ));
    }
    out
}

pub fn result_table(table: &ResultTable) -> String {
    if table.is_empty() {
        return "<section>No Results</section>".to_string();
    }

    let headers: String = table
        .headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape(h)))
        .collect();
    let rows: String = table
        .rows
        .iter()
        .map(|row| {
            let cells: String = row.iter().map(|c| format!("<td>{}</td>", escape(c))).collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();

    format!(
        r#"<table class="results"><thead><tr>{}</tr></thead><tbody>{}</tbody></table>"#,
        headers, rows
    )
}

/// Dual-list scripture picker; every control submits an `op` to the enclosing form
///
/// The hidden first button makes Enter in the search box run a search.
pub fn scripture_selector(
    selection: &ScriptureSelection,
    all: &[Scripture],
    offer_defaults: bool,
) -> String {
    let available = selection.available(all);
    let selected = selection.selected(all);

    let available_items: String = if available.is_empty() {
        let message = if selection.search().is_empty() {
            "All available scriptures are selected"
        } else {
            "No scriptures found matching your search"
        };
        format!(r#"<li class="empty">{}</li>"#, message)
    } else {
        available
            .iter()
            .map(|s| selector_item(s, "available", "+"))
            .collect()
    };

    let selected_items: String = if selected.is_empty() {
        r#"<li class="empty">Drag scripture files here or click + to select</li>"#.to_string()
    } else {
        selected
            .iter()
            .map(|s| selector_item(s, "selected", "&#10005;"))
            .collect()
    };

    let defaults_button = if offer_defaults {
        r#"<button type="submit" name="op" value="defaults">Add Defaults</button>"#
    } else {
        ""
    };
    let clear_button = if selection.is_empty() {
        ""
    } else {
        r#"<button type="submit" name="op" value="clear" class="danger small">Clear</button>"#
    };
    let clear_search = if selection.search().is_empty() {
        ""
    } else {
        r#"<button type="submit" name="op" value="clear-search" class="small" aria-label="Clear search">&times;</button>"#
    };
    let warning = if selection.is_empty() {
        r#"<p class="text-error">Please select at least one scripture file</p>"#
    } else {
        ""
    };

    format!(
        r#"<div class="selector" data-selector>
    <button type="submit" name="op" value="search" class="visually-hidden" tabindex="-1">Search</button>
    <input type="hidden" name="selected" value="{selected_value}">
    <div class="selector-toolbar">{defaults_button}</div>
    <div class="selector-zones">
        <div class="zone-wrap">
            <div class="zone-title">Available Scripture Files</div>
            <div class="search-box">
                <input type="text" name="search" value="{search}" placeholder="Search scripture files...">
                {clear_search}
            </div>
            <ul class="zone" data-zone="available">{available_items}</ul>
        </div>
        <div class="zone-wrap">
            <div class="zone-title">Selected ({count}) {clear_button}</div>
            <ul class="zone selected" data-zone="selected">{selected_items}</ul>
        </div>
    </div>
    {warning}
    <p class="hint">Drag scripture files from left to right to select them, or click the + button. Drag from right to left to remove them.</p>
</div>"#,
        selected_value = escape(&selection.to_query_value()),
        search = escape(selection.search()),
        count = selection.len(),
    )
}

fn selector_item(scripture: &Scripture, zone: &str, symbol: &str) -> String {
    format!(
        r#"<li draggable="true" data-id="{id}" data-zone="{zone}" title="{title}"><span>{lang} / {name}</span><button type="submit" name="op" value="toggle:{id}">{symbol}</button></li>"#,
        id = escape(&scripture.id),
        lang = escape(&scripture.lang_code),
        name = escape(&scripture.name),
        title = escape(&format!(
            "Drag {} / {} to {}",
            scripture.lang_code,
            scripture.name,
            if zone == "available" { "select" } else { "remove" }
        )),
    )
}

/// Book picker laid out OT then NT, chips tinted by group
pub fn book_selector(selection: &BookSelection, details: &BTreeMap<String, f64>) -> String {
    let total = books::all_books().count();

    let chips_for = |testament: Testament| -> String {
        BOOK_GROUPS
            .iter()
            .filter(|g| g.testament == testament)
            .flat_map(|g| g.books.iter().map(move |code| (g.key, *code)))
            .map(|(key, code)| {
                let percent = details.get(code).copied().unwrap_or(0.0);
                let selected = selection.contains(code);
                let mut title = books::book_name(code).to_string();
                if let Some(text) = completion_text(percent) {
                    title.push_str(&format!(" ({})", text));
                }
                let mut class = format!("book-chip group-{}", key);
                if selected {
                    class.push_str(" selected");
                } else if percent > 0.0 {
                    class.push_str(" has-text");
                }
                format!(
                    r#"<button type="submit" name="op" value="toggle:{code}" class="{class}" title="{title}">{code}</button>"#,
                    title = escape(&title),
                )
            })
            .collect()
    };

    format!(
        r#"<div class="book-selector">
    <input type="hidden" name="books" value="{books_value}">
    <div class="book-selector-header">
        <h4>Select Books to Translate</h4>
        <button type="submit" name="op" value="none">Select None</button>
    </div>
    <div class="muted">{count} of {total} books selected</div>
    <div class="book-grid">{ot}</div>
    <hr>
    <div class="book-grid">{nt}</div>
</div>"#,
        books_value = escape(&selection.to_query_value()),
        count = selection.count(),
        ot = chips_for(Testament::Old),
        nt = chips_for(Testament::New),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(source: &str, book: &str, pdf: bool) -> Draft {
        Draft {
            project_id: "P".to_string(),
            source_scripture_name: source.to_string(),
            book_name: book.to_string(),
            train_experiment_name: "e".to_string(),
            has_pdf: pdf,
        }
    }

    #[test]
    fn test_draft_sources_sorted_with_pdf_marker() {
        let drafts = vec![draft("zz-B", "MAT", false), draft("aa-A", "MRK", true)];
        let html = draft_sources(&drafts);
        let a = html.find("aa-A").unwrap();
        let z = html.find("zz-B").unwrap();
        assert!(a < z);
        assert!(html.contains("MRK*"));
        assert!(!html.contains("MAT*"));
    }

    #[test]
    fn test_draft_groups_empty() {
        assert!(draft_groups(&[]).contains("No Drafts"));
    }

    #[test]
    fn test_result_table_escapes_cells() {
        let table = ResultTable {
            headers: vec!["a<b".to_string()],
            rows: vec![vec!["<script>".to_string()]],
        };
        let html = result_table(&table);
        assert!(html.contains("<th>a&lt;b</th>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(result_table(&ResultTable::default()).contains("No Results"));
    }

    #[test]
    fn test_scripture_selector_zones() {
        let all: Vec<Scripture> = serde_json::from_value(json!([
            {"id": "en-NIV84", "name": "NIV", "lang_code": "en"},
            {"id": "fr-LSG", "name": "LSG", "lang_code": "fr"}
        ]))
        .unwrap();
        let selection = ScriptureSelection::new(vec!["fr-LSG".to_string()], "");
        let html = scripture_selector(&selection, &all, true);
        assert!(html.contains(r#"value="fr-LSG""#));
        assert!(html.contains(r#"data-id="en-NIV84" data-zone="available""#));
        assert!(html.contains(r#"data-id="fr-LSG" data-zone="selected""#));
        assert!(html.contains("Add Defaults"));
        assert!(html.contains("Selected (1)"));
        assert!(html.contains("fr / LSG"));
        assert!(!html.contains("Please select at least one scripture file"));
    }

    #[test]
    fn test_book_selector_counts_and_titles() {
        let mut details = BTreeMap::new();
        details.insert("GEN".to_string(), 100.0);
        details.insert("EXO".to_string(), 40.0);
        let selection = BookSelection::from_query(Some("MAT"));
        let html = book_selector(&selection, &details);
        assert!(html.contains("1 of 66 books selected"));
        assert!(html.contains(r#"title="Genesis (Complete)""#));
        assert!(html.contains(r#"title="Exodus (40% complete)""#));
        assert!(html.contains(r#"class="book-chip group-gospels selected""#));
    }

    #[test]
    fn test_completion_grid_summary() {
        let mut details = BTreeMap::new();
        details.insert("REV".to_string(), 100.0);
        let report = CompletionReport::build(&details, &[draft("x", "REV", false)]);
        let html = completion_grid(&report);
        assert!(html.contains("NT: 1/27 complete, 1 drafted"));
        assert!(html.contains("OT: 0/39 complete, 0 drafted"));
        assert!(html.contains(r#"title="Revelation: 100% (Drafted)""#));
    }
}
