use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use log::{debug, info, warn};
use crate::errors::WikiError;
use crate::router::Operation;
use crate::types::{IndexPage, Page};
use crate::utils::{escape_html, last_modified_html};

pub const INDEX_TEMPLATE: &str = "index.html";
pub const VIEW_TEMPLATE: &str = "view.html";
pub const EDIT_TEMPLATE: &str = "edit.html";

const TEMPLATE_NAMES: [&str; 3] = [INDEX_TEMPLATE, VIEW_TEMPLATE, EDIT_TEMPLATE];

const BUILTIN_INDEX: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{{TITLE}}</title></head><body><h1>{{TITLE}}</h1><ul class=\"listing\">\n{{TITLES}}</ul></body></html>";
const BUILTIN_VIEW: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{{TITLE}}</title></head><body><h1>{{TITLE}}</h1><p>[<a href=\"/edit/{{TITLE}}\">edit</a>] [<a href=\"/\">index</a>]</p>{{MODIFIED}}<div class=\"page-body\">{{BODY}}</div></body></html>";
const BUILTIN_EDIT: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>Editing {{TITLE}}</title></head><body><h1>Editing {{TITLE}}</h1><form action=\"/save/{{TITLE}}\" method=\"POST\"><div><textarea name=\"body\" rows=\"20\" cols=\"80\">{{BODY}}</textarea></div><div><input type=\"submit\" value=\"Save\"></div></form></body></html>";

/// Named HTML templates with `{{PLACEHOLDER}}` substitution
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    templates: HashMap<String, String>,
}

impl Renderer {
    /// A renderer with no templates; every render fails until some are added
    pub fn new() -> Self {
        Self::default()
    }

    /// The templates compiled into the binary
    pub fn builtin() -> Self {
        Self::new()
            .with_template(INDEX_TEMPLATE, BUILTIN_INDEX)
            .with_template(VIEW_TEMPLATE, BUILTIN_VIEW)
            .with_template(EDIT_TEMPLATE, BUILTIN_EDIT)
    }

    /// Load `index.html`, `view.html` and `edit.html` from `dir`.
    ///
    /// Absent files are skipped with a warning and fail at render time;
    /// unreadable ones fail here.
    pub fn from_dir(dir: &Path) -> Result<Self, WikiError> {
        let mut renderer = Self::new();
        for name in TEMPLATE_NAMES {
            let path = dir.join(name);
            match fs::read_to_string(&path) {
                Ok(source) => {
                    debug!("Loaded template {:?}", path);
                    renderer.templates.insert(name.to_string(), source);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("Template {:?} is missing", path);
                }
                Err(e) => return Err(WikiError::Io(e)),
            }
        }
        info!("Loaded {} templates from {:?}", renderer.templates.len(), dir);
        Ok(renderer)
    }

    pub fn with_template(mut self, name: &str, source: &str) -> Self {
        self.templates.insert(name.to_string(), source.to_string());
        self
    }

    fn template(&self, name: &str) -> Result<&str, WikiError> {
        self.templates
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| WikiError::Render(format!("template \"{}\" is not loaded", name)))
    }

    /// Render a page through `view.html` or `edit.html`
    pub fn render_page(&self, name: &str, page: &Page) -> Result<String, WikiError> {
        let template = self.template(name)?;
        // Body goes in last so its text is never scanned for placeholders.
        let html = template
            .replace("{{TITLE}}", &escape_html(&page.title))
            .replace("{{MODIFIED}}", &last_modified_html(page.modified))
            .replace("{{BODY}}", &escape_html(&page.body_text()));
        Ok(html)
    }

    /// Render the page listing through `index.html`
    pub fn render_index(&self, index: &IndexPage) -> Result<String, WikiError> {
        let template = self.template(INDEX_TEMPLATE)?;
        let mut items = String::new();
        for title in &index.titles {
            items.push_str(&format!(
                "  <li><a href=\"{}\">{}</a></li>\n",
                escape_html(&Operation::View.path_for(title)),
                escape_html(title)
            ));
        }
        let html = template
            .replace("{{TITLE}}", &escape_html(&index.title))
            .replace("{{TITLES}}", &items);
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_escapes_body() {
        let page = Page { title: "Home".into(), body: b"<script>{{TITLE}}</script>".to_vec(), modified: None };
        let html = Renderer::builtin().render_page(VIEW_TEMPLATE, &page).unwrap();
        assert!(html.contains("&lt;script&gt;{{TITLE}}&lt;/script&gt;"));
        assert!(html.contains("<a href=\"/edit/Home\">edit</a>"));
    }

    #[test]
    fn edit_form_posts_body_field_to_save() {
        let html = Renderer::builtin().render_page(EDIT_TEMPLATE, &Page::empty("Draft")).unwrap();
        assert!(html.contains("action=\"/save/Draft\""));
        assert!(html.contains("<textarea name=\"body\" rows=\"20\" cols=\"80\"></textarea>"));
    }

    #[test]
    fn index_links_each_title() {
        let index = IndexPage { title: "Wiki".into(), titles: vec!["Alpha".into(), "Beta".into()] };
        let html = Renderer::builtin().render_index(&index).unwrap();
        assert!(html.contains("<li><a href=\"/view/Alpha\">Alpha</a></li>"));
        assert!(html.contains("<li><a href=\"/view/Beta\">Beta</a></li>"));
    }

    #[test]
    fn missing_template_is_render_error() {
        let err = Renderer::new().render_page(VIEW_TEMPLATE, &Page::empty("X")).unwrap_err();
        assert!(matches!(err, WikiError::Render(ref msg) if msg.contains("view.html")));
    }

    #[test]
    fn from_dir_loads_present_templates_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(VIEW_TEMPLATE), "<p>{{TITLE}}: {{BODY}}</p>").unwrap();
        let renderer = Renderer::from_dir(dir.path()).unwrap();
        let page = Page { title: "A".into(), body: b"b".to_vec(), modified: None };
        assert_eq!(renderer.render_page(VIEW_TEMPLATE, &page).unwrap(), "<p>A: b</p>");
        assert!(renderer.render_page(EDIT_TEMPLATE, &page).is_err());
    }
}
