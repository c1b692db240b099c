//! 结果页的元素模型
//!
//! 页面上每个元素都可能不存在，缺失时对应的更新直接跳过。
//! `Page::from_html` 根据服务端渲染的 HTML 判断哪些元素存在。

use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;
use regex::Regex;

use crate::core::error::MonitorResult;
use crate::core::status::{StatusKind, StatusRender, Tone};
use crate::utils::validator::ScrapeForm;
use super::alert::AlertCenter;
use super::StatusView;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<[^>]*\sid\s*=\s*["']task-id["'][^>]*>"#).expect("静态正则"))
}

fn data_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\sdata-task-id\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("静态正则"))
}

fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\sid\s*=\s*["']([A-Za-z0-9_-]+)["']"#).expect("静态正则"))
}

/// 从结果页 HTML 中取出 `#task-id` 元素的 `data-task-id`，为空时返回 None
pub fn extract_task_id(html: &str) -> Option<String> {
    let tag = tag_regex().find(html)?;
    let caps = data_attr_regex().captures(tag.as_str())?;
    // 属性值可能用双引号或单引号
    let id = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressBar {
    pub width: String,
    pub value_now: i64,
    pub text: String,
    pub classes: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextElement {
    pub text: String,
    pub classes: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub text: String,
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorsContainer {
    /// 对应 `d-none`
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionButton {
    pub disabled: bool,
    pub title: Option<String>,
    pub tooltip_placement: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub form: ScrapeForm,
    pub was_validated: bool,
}

/// 结果页（以及首页表单）上脚本会操作的元素
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub task_id: Option<String>,
    pub progress_bar: Option<ProgressBar>,
    pub status_text: Option<TextElement>,
    pub files_count: Option<TextElement>,
    pub total_size: Option<TextElement>,
    pub errors_list: Option<Vec<ListItem>>,
    pub errors_container: Option<ErrorsContainer>,
    pub download_btn: Option<ActionButton>,
    pub alert_container: Option<AlertCenter>,
    pub scrape_form: Option<FormState>,
}

impl Page {
    /// 所有结果页元素齐全的页面
    pub fn results(task_id: &str, alerts: AlertCenter) -> Self {
        Self {
            task_id: Some(task_id.to_string()),
            progress_bar: Some(ProgressBar::default()),
            status_text: Some(TextElement::default()),
            files_count: Some(TextElement::default()),
            total_size: Some(TextElement::default()),
            errors_list: Some(Vec::new()),
            errors_container: Some(ErrorsContainer { hidden: true }),
            download_btn: Some(ActionButton { disabled: true, title: None, tooltip_placement: None }),
            alert_container: Some(alerts),
            scrape_form: None,
        }
    }

    /// 首页：只有抓取表单和横幅容器
    pub fn index(form: ScrapeForm, alerts: AlertCenter) -> Self {
        Self {
            alert_container: Some(alerts),
            scrape_form: Some(FormState { form, was_validated: false }),
            ..Self::default()
        }
    }

    /// 按 HTML 中出现的元素 id 构建页面
    pub fn from_html(html: &str, alerts: AlertCenter) -> Self {
        let ids: HashSet<&str> = id_regex()
            .captures_iter(html)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        let has = |id: &str| ids.contains(id);

        Self {
            task_id: if has("task-id") { extract_task_id(html) } else { None },
            progress_bar: has("progress-bar").then(ProgressBar::default),
            status_text: has("status-text").then(TextElement::default),
            files_count: has("files-count").then(TextElement::default),
            total_size: has("total-size").then(TextElement::default),
            errors_list: has("errors-list").then(Vec::new),
            errors_container: has("errors-container").then(|| ErrorsContainer { hidden: true }),
            download_btn: has("download-btn")
                .then(|| ActionButton { disabled: true, title: None, tooltip_placement: None }),
            alert_container: has("alert-container").then_some(alerts),
            scrape_form: has("scrape-form")
                .then(|| FormState { form: ScrapeForm::default(), was_validated: false }),
        }
    }

    /// 页面加载时要轮询的任务；没有任务ID则不轮询
    pub fn watch_target(&self) -> Option<&str> {
        self.task_id.as_deref().filter(|id| !id.is_empty())
    }

    /// 提交表单：先做约束校验，不论结果都标记 was-validated。
    /// 页面没有表单时返回 None
    pub fn submit_form(&mut self) -> Option<MonitorResult<ScrapeForm>> {
        let state = self.scrape_form.as_mut()?;
        let result = state.form.validate().map(|_| state.form.clone());
        state.was_validated = true;
        Some(result)
    }

    pub fn alerts(&self) -> Vec<super::alert::Alert> {
        self.alert_container.as_ref().map(|c| c.alerts()).unwrap_or_default()
    }
}

fn set_tone_class(classes: &mut BTreeSet<String>, tone: Tone, class_of: fn(&Tone) -> String) {
    for t in Tone::ALL {
        classes.remove(&class_of(&t));
    }
    classes.insert(class_of(&tone));
}

impl StatusView for Page {
    fn render(&mut self, update: &StatusRender) {
        if let Some(bar) = self.progress_bar.as_mut() {
            bar.width = format!("{}%", update.percent);
            bar.value_now = update.percent;
            bar.text = format!("{}%", update.percent);
            set_tone_class(&mut bar.classes, update.tone, Tone::progress_class);
        }

        if let Some(status) = self.status_text.as_mut() {
            status.text = update.label.clone();
            set_tone_class(&mut status.classes, update.tone, Tone::text_class);
        }

        if let Some(files) = self.files_count.as_mut() {
            files.text = update.files_count.clone();
        }
        if let Some(size) = self.total_size.as_mut() {
            size.text = update.total_size.clone();
        }

        if let Some(list) = self.errors_list.as_mut() {
            list.clear();
            let has_errors = !update.errors.is_empty();
            if let Some(container) = self.errors_container.as_mut() {
                container.hidden = !has_errors;
            }
            list.extend(update.errors.iter().map(|e| ListItem {
                text: e.clone(),
                classes: vec!["list-group-item".into(), "bg-dark".into(), "text-danger".into()],
            }));
        }
    }

    fn finish(&mut self, kind: &StatusKind) {
        if let Some(btn) = self.download_btn.as_mut() {
            btn.disabled = false;
            btn.title = Some(kind.finish_hint().to_string());
            btn.tooltip_placement = Some("top".to_string());
        }
    }

    fn show_alert(&mut self, message: &str, tone: Tone) {
        if let Some(container) = self.alert_container.as_ref() {
            container.show(message, tone);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::TaskStatus;

    const RESULTS_HTML: &str = r#"
        <div id="alert-container"></div>
        <span id="task-id" class="d-none" data-task-id="3f2a-77"></span>
        <div class="progress"><div id="progress-bar" class="progress-bar"></div></div>
        <span id="status-text">Starting</span>
        <span id="files-count">0</span>
        <span id="total-size">0 Bytes</span>
        <div id="errors-container" class="d-none"><ul id="errors-list"></ul></div>
        <a id="download-btn" class="btn disabled" href="/static/downloads/3f2a-77/index.html">View</a>
    "#;

    fn render(page: &mut Page, json: &str) {
        let status: TaskStatus = serde_json::from_str(json).unwrap();
        page.render(&StatusRender::from(&status));
    }

    #[test]
    fn test_extract_task_id() {
        assert_eq!(extract_task_id(RESULTS_HTML), Some("3f2a-77".to_string()));
        assert_eq!(extract_task_id(r#"<span data-task-id="x1" id="task-id"></span>"#), Some("x1".to_string()));
        assert_eq!(extract_task_id(r#"<span id="task-id" data-task-id=""></span>"#), None);
        assert_eq!(extract_task_id(r#"<span id="other" data-task-id="x1"></span>"#), None);
    }

    #[test]
    fn test_single_quoted_attributes() {
        assert_eq!(extract_task_id("<span id='task-id' data-task-id='9c-41'></span>"), Some("9c-41".to_string()));
        assert_eq!(extract_task_id(r#"<span id='task-id' data-task-id="9c-42"></span>"#), Some("9c-42".to_string()));
        assert_eq!(extract_task_id("<span id='task-id' data-task-id=''></span>"), None);

        let page = Page::from_html(
            "<div id='alert-container'></div><span id='task-id' data-task-id='9c-41'></span><div id='progress-bar'></div>",
            AlertCenter::default(),
        );
        assert_eq!(page.watch_target(), Some("9c-41"));
        assert!(page.progress_bar.is_some());
        assert!(page.alert_container.is_some());
        assert!(page.status_text.is_none());
    }

    #[test]
    fn test_from_html_detects_elements() {
        let page = Page::from_html(RESULTS_HTML, AlertCenter::default());
        assert_eq!(page.watch_target(), Some("3f2a-77"));
        assert!(page.progress_bar.is_some());
        assert!(page.errors_list.is_some());
        assert!(page.download_btn.as_ref().unwrap().disabled);
        assert!(page.scrape_form.is_none());

        let bare = Page::from_html("<p>nothing here</p>", AlertCenter::default());
        assert_eq!(bare.watch_target(), None);
        assert!(bare.alert_container.is_none());
    }

    #[test]
    fn test_exactly_one_tone_class() {
        let mut page = Page::results("t", AlertCenter::default());
        for (status, class) in [
            ("starting", "bg-warning"),
            ("running", "bg-info"),
            ("failed", "bg-danger"),
            ("mystery", "bg-warning"),
            ("completed", "bg-success"),
        ] {
            render(&mut page, &format!(r#"{{"status":"{}","progress":50}}"#, status));
            let bar = page.progress_bar.as_ref().unwrap();
            assert_eq!(bar.classes.len(), 1);
            assert!(bar.classes.contains(class));
            let text = page.status_text.as_ref().unwrap();
            assert_eq!(text.classes.len(), 1);
            assert!(text.classes.contains(&class.replace("bg-", "text-")));
        }
    }

    #[test]
    fn test_progress_and_stats() {
        let mut page = Page::results("t", AlertCenter::default());
        render(&mut page, r#"{"status":"running","progress":41.5,"files_downloaded":12,"total_size":1536}"#);
        let bar = page.progress_bar.as_ref().unwrap();
        assert_eq!(bar.width, "42%");
        assert_eq!(bar.text, "42%");
        assert_eq!(bar.value_now, 42);
        assert_eq!(page.status_text.as_ref().unwrap().text, "Running");
        assert_eq!(page.files_count.as_ref().unwrap().text, "12");
        assert_eq!(page.total_size.as_ref().unwrap().text, "1.5 KB");
    }

    #[test]
    fn test_error_list_visibility() {
        let mut page = Page::results("t", AlertCenter::default());
        render(&mut page, r#"{"status":"running","errors":["e1","e2","e3"]}"#);
        let items: Vec<_> = page.errors_list.as_ref().unwrap().iter().map(|i| i.text.as_str()).collect();
        assert_eq!(items, vec!["e1", "e2", "e3"]);
        assert!(!page.errors_container.as_ref().unwrap().hidden);

        render(&mut page, r#"{"status":"running","errors":[]}"#);
        assert!(page.errors_list.as_ref().unwrap().is_empty());
        assert!(page.errors_container.as_ref().unwrap().hidden);

        render(&mut page, r#"{"status":"running","errors":["again"]}"#);
        render(&mut page, r#"{"status":"running"}"#);
        assert!(page.errors_list.as_ref().unwrap().is_empty());
        assert!(page.errors_container.as_ref().unwrap().hidden);
    }

    #[test]
    fn test_missing_elements_are_skipped() {
        let mut page = Page::default();
        render(&mut page, r#"{"status":"failed","errors":["x"]}"#);
        page.finish(&StatusKind::Failed);
        page.show_alert("ignored", Tone::Danger);
        assert!(page.alerts().is_empty());

        // 只有列表没有容器
        let mut page = Page { errors_list: Some(Vec::new()), ..Page::default() };
        render(&mut page, r#"{"status":"failed","errors":["x"]}"#);
        assert_eq!(page.errors_list.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_finish_enables_button() {
        let mut page = Page::results("t", AlertCenter::default());
        page.finish(&StatusKind::Completed);
        let btn = page.download_btn.as_ref().unwrap();
        assert!(!btn.disabled);
        assert_eq!(btn.title.as_deref(), Some("View the archived website in a new tab"));

        page.finish(&StatusKind::Failed);
        let btn = page.download_btn.as_ref().unwrap();
        assert_eq!(btn.title.as_deref(), Some("View the partially archived website"));
    }

    #[test]
    fn test_form_submit_marks_validated() {
        let mut page = Page::index(ScrapeForm::default(), AlertCenter::default());
        let result = page.submit_form().unwrap();
        assert!(result.is_err());
        assert!(page.scrape_form.as_ref().unwrap().was_validated);

        page.scrape_form.as_mut().unwrap().form.url = "https://example.com".to_string();
        let form = page.submit_form().unwrap().unwrap();
        assert_eq!(form.url, "https://example.com");

        assert!(Page::default().submit_form().is_none());
    }
}
